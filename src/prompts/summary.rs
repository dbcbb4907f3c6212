use crate::inference::Prompt;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Keep answers concise (under 100 words).";
const USER_PREFIX: &str = "Explain this topic simply: ";

/// Build the two-message prompt for a topic summary.
///
/// The topic is interpolated verbatim: no trimming, escaping, or length
/// checks happen here.
pub fn build_summary_prompt(topic: &str) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!("{USER_PREFIX}{topic}"),
    }
}
