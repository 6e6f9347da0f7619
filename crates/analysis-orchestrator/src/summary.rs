use analysis_core::Summarizer;

pub const SUMMARY_HEADER: &str = "🧠 **AI 市場總結**";
pub const DETAIL_HEADER: &str = "**詳細數據**";
pub const SEPARATOR_LINE: &str = "—————";

/// Builds the summarization prompt and merges the reply with the raw report.
pub struct SummaryRequestBuilder;

impl SummaryRequestBuilder {
    pub fn prompt(report: &str) -> String {
        format!(
            "請扮演一位專業、言簡意賅的金融市場分析師。\n\
             我將提供一份包含多項金融商品最新價格與 KD 指標的市場數據摘要。\n\
             請您根據這份數據，提供一段約 100 字的「市場動態總結」。\n\
             \n\
             您的總結應包含：\n\
             1. 快速點出各商品的目前走勢（例如：強勢、盤整、轉弱）。\n\
             2. 點出整體市場的漲跌狀況（例如：普遍強勢、漲跌互見）。\n\
             3. 點出任何顯著的警示信號（例如：XXX 進入超買區）。\n\
             \n\
             請使用繁體中文，語氣專業。\n\
             \n\
             [原始數據]\n\
             {report}"
        )
    }

    /// Summary section, separator, then the untouched report.
    pub fn merge(summary: &str, report: &str) -> String {
        format!(
            "{SUMMARY_HEADER}\n{summary}\n\n{SEPARATOR_LINE}\n{DETAIL_HEADER}\n{SEPARATOR_LINE}\n{report}"
        )
    }

    /// Calls the summarizer once. Any failure, including an empty reply,
    /// returns `report` unchanged.
    pub async fn build_final_message<S>(report: &str, summarizer: &S) -> String
    where
        S: Summarizer + ?Sized,
    {
        let prompt = Self::prompt(report);
        match summarizer.summarize(&prompt).await {
            Ok(summary) if !summary.trim().is_empty() => {
                tracing::info!(chars = summary.chars().count(), "AI summary received");
                Self::merge(summary.trim(), report)
            }
            Ok(_) => {
                tracing::warn!("Summarizer returned empty text, sending raw report only");
                report.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Summary unavailable, sending raw report only");
                report.to_string()
            }
        }
    }
}
