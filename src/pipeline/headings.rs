use crate::settings::ApiKeys;

pub const NO_KEY_MESSAGE: &str = "No API key provided";

/// Placeholder H2 suggestion. Names the provider that would be asked;
/// OpenAI wins when both keys are set. Makes no network call.
pub fn generate_h2s(query: &str, keys: &ApiKeys) -> String {
    if keys.openai.is_some() {
        format!("OpenAI H2 suggestions for: {}", query)
    } else if keys.gemini.is_some() {
        format!("Gemini H2 suggestions for: {}", query)
    } else {
        NO_KEY_MESSAGE.to_string()
    }
}
