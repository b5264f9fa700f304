//! Narration excerpt extraction.
//!
//! The interpreter is asked to close its answer with a paragraph that starts
//! with [`SUMMARY_MARKER`]. This module cuts that paragraph out of the free
//! text so only a short passage is read aloud. The scan depends on the model
//! actually emitting the marker; when it does not, [`DEFAULT_SUMMARY`] is used.
//!
//! Author: kelexine (<https://github.com/kelexine>)

/// Label that opens the summary paragraph ("summary explanation").
pub const SUMMARY_MARKER: &str = "總結說明";

/// Read aloud when no summary paragraph is found.
pub const DEFAULT_SUMMARY: &str = "本產品含有多種成分，請依個人狀況斟酌使用。";

/// Result of a summary scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    /// `true` when no marker line was found and [`DEFAULT_SUMMARY`] was substituted.
    pub fallback: bool,
}

/// Extract the summary block from `text`.
///
/// Collection starts at the first line containing the marker and runs over
/// the following non-blank lines, stopping at the first blank one. Lines are
/// trimmed and joined with `\n`. Later marker lines inside the block are kept
/// as ordinary lines.
pub fn extract_summary(text: &str) -> Summary {
    let mut block = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if block.is_empty() {
            if line.contains(SUMMARY_MARKER) {
                block.push_str(trimmed);
            }
        } else if trimmed.is_empty() {
            break;
        } else {
            block.push('\n');
            block.push_str(trimmed);
        }
    }

    if block.is_empty() {
        Summary {
            text: DEFAULT_SUMMARY.to_string(),
            fallback: true,
        }
    } else {
        Summary {
            text: block,
            fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_between_blank_lines() {
        let text = [
            "# Title",
            "Some details.",
            "",
            "總結說明：用途簡述",
            "第二行補充",
            "",
            "trailing unrelated text",
        ]
        .join("\n");

        let summary = extract_summary(&text);
        assert_eq!(summary.text, "總結說明：用途簡述\n第二行補充");
        assert!(!summary.fallback);
    }

    #[test]
    fn test_no_marker_uses_default() {
        let summary = extract_summary("這是一般說明\n\n沒有總結段落");
        assert_eq!(summary.text, DEFAULT_SUMMARY);
        assert!(summary.fallback);
    }

    #[test]
    fn test_empty_input_uses_default() {
        assert_eq!(extract_summary("").text, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_marker_on_last_line() {
        let summary = extract_summary("內容\n\n   **總結說明**：適量食用即可   ");
        assert_eq!(summary.text, "**總結說明**：適量食用即可");
    }

    #[test]
    fn test_block_runs_to_end_without_blank_line() {
        let summary = extract_summary("總結說明：第一句\n第二句\n第三句");
        assert_eq!(summary.text, "總結說明：第一句\n第二句\n第三句");
    }

    #[test]
    fn test_second_marker_is_appended() {
        let summary = extract_summary("總結說明：A\n總結說明：B\n\n總結說明：C");
        assert_eq!(summary.text, "總結說明：A\n總結說明：B");
    }

    #[test]
    fn test_whitespace_only_line_ends_block() {
        let summary = extract_summary("總結說明：A\n  \t \nB");
        assert_eq!(summary.text, "總結說明：A");
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let summary = extract_summary("前言\r\n總結說明：A\r\n補充\r\n\r\n後記");
        assert_eq!(summary.text, "總結說明：A\n補充");
    }

    proptest! {
        #[test]
        fn prop_extraction_is_deterministic(text in "[a-z總結說明 \n]{0,80}") {
            prop_assert_eq!(extract_summary(&text), extract_summary(&text));
        }

        #[test]
        fn prop_no_marker_always_falls_back(text in "[a-z \n]{0,80}") {
            let summary = extract_summary(&text);
            prop_assert!(summary.fallback);
            prop_assert_eq!(summary.text, DEFAULT_SUMMARY);
        }

        #[test]
        fn prop_block_starts_with_marker_line(prefix in "[a-z \n]{0,40}", tail in "[a-z \n]{0,40}") {
            let text = format!("{}\n總結說明{}", prefix, tail);
            let summary = extract_summary(&text);
            prop_assert!(!summary.fallback);
            prop_assert!(summary.text.lines().next().unwrap().contains(SUMMARY_MARKER));
            prop_assert!(summary.text.lines().all(|l| !l.trim().is_empty()));
        }
    }
}
