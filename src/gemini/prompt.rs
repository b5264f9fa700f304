// Instruction text sent alongside the label image
// Author: kelexine (https://github.com/kelexine)

use crate::summary::SUMMARY_MARKER;

const BASE_PROMPT: &str = "這是一張商品標籤的圖片，請：

1. 用簡單中文說明它是食品或藥品。
2. 清楚列出以下內容：
   - 類型（食品 / 藥品）
   - 中文名稱（如果有）
   - 主要成分：針對每個成分簡單說明它的用途（例如：增加口感、防腐、代糖等），並指出是否需要特別注意（例如對某些族群不建議、可能引起過敏、實際無健康價值但常被使用）。
3. 使用不超過國中程度的中文說明，適合長者與一般民眾理解。
4. 若可行，請為重要的成分提供簡單的資料來源（如食藥署、WHO 等）。";

/// Build the instruction text.
///
/// With `with_summary` the model is also asked to close with a paragraph that
/// starts with the summary marker, which is what the narration is cut from.
pub fn label_prompt(with_summary: bool) -> String {
    if !with_summary {
        return BASE_PROMPT.to_string();
    }

    format!(
        "{BASE_PROMPT}
5. 最後請另起一段，以「{SUMMARY_MARKER}：」開頭，用兩到三句話總結這個產品的用途與需要注意的地方，適合直接朗讀給長者聽。這一段必須是整份回答的最後一段，前後都不要加入任何額外的說明或客套話。"
    )
}
