// Narration chunking for the translate TTS endpoint
// Author: kelexine (https://github.com/kelexine)

/// Characters after which a piece may end.
const BREAK_AFTER: &[char] = &[
    '。', '，', '、', '：', '；', '！', '？', '.', ',', ';', ':', '!', '?', '…', '\n',
];

/// Split `text` into chunks of at most `max_chars` characters.
///
/// The text is first cut after sentence and clause punctuation, adjacent
/// pieces are then merged while they fit, and pieces that are still too long
/// are broken at the last whitespace before the limit (or hard-cut when there
/// is none). Chunks with nothing to pronounce are dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if BREAK_AFTER.contains(&c) {
            pieces.push(std::mem::take(&mut current));
        }
    }
    pieces.push(current);

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces.iter().flat_map(|p| minimize(p.trim(), max_chars)) {
        if current.is_empty() {
            current = piece;
            continue;
        }

        let sep = separator(&current, &piece);
        if char_len(&current) + sep.len() + char_len(&piece) <= max_chars {
            current.push_str(sep);
            current.push_str(&piece);
        } else {
            chunks.push(std::mem::replace(&mut current, piece));
        }
    }
    chunks.push(current);

    chunks.retain(|c| !is_silent(c));
    chunks
}

/// Break a piece longer than `max_chars` into pieces that fit.
fn minimize(piece: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = piece.trim();

    while char_len(rest) > max_chars {
        // byte offset of the char just past the limit
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let cut = rest[..limit]
            .char_indices()
            .filter(|(i, c)| c.is_whitespace() && *i > 0)
            .map(|(i, _)| i)
            .last()
            .unwrap_or(limit);

        out.push(rest[..cut].trim_end().to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

/// Words in space-delimited scripts need a space when rejoined; CJK text does not.
fn separator(left: &str, right: &str) -> &'static str {
    let l = left.chars().last().map(|c| c.is_ascii()).unwrap_or(false);
    let r = right
        .chars()
        .next()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false);
    if l && r {
        " "
    } else {
        ""
    }
}

fn is_silent(chunk: &str) -> bool {
    chunk
        .chars()
        .all(|c| c.is_whitespace() || c.is_ascii_punctuation() || BREAK_AFTER.contains(&c))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_text("總結說明：適量食用。", 100), vec!["總結說明：適量食用。"]);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(split_text("", 100).is_empty());
        assert!(split_text("  \n。，!! ", 100).is_empty());
    }

    #[test]
    fn test_splits_at_punctuation_when_too_long() {
        let chunks = split_text("第一句話。第二句話。第三句話。", 10);
        assert_eq!(chunks, vec!["第一句話。第二句話。", "第三句話。"]);
    }

    #[test]
    fn test_long_piece_breaks_at_whitespace() {
        let chunks = split_text("alpha beta gamma delta", 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_long_piece_without_whitespace_is_hard_cut() {
        let chunks = split_text("一二三四五六七八九十", 4);
        assert_eq!(chunks, vec!["一二三四", "五六七八", "九十"]);
    }

    #[test]
    fn test_newlines_are_breaks() {
        let chunks = split_text("總結說明：A\n補充說明", 6);
        assert_eq!(chunks, vec!["總結說明：A", "補充說明"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_limit(text in "[a-z總結說明。， \n]{0,200}", max in 1usize..40) {
            for chunk in split_text(&text, max) {
                prop_assert!(chunk.chars().count() <= max);
                prop_assert!(!chunk.trim().is_empty());
            }
        }

        #[test]
        fn prop_no_text_is_lost(text in "[a-z總結說明 ]{0,200}", max in 1usize..40) {
            let joined: String = split_text(&text, max).concat();
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            prop_assert_eq!(strip(&joined), strip(&text));
        }
    }
}
