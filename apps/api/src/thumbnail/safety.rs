use crate::errors::AppError;

pub const MAX_PROMPT_CHARS: usize = 400;
pub const MAX_NEGATIVE_PROMPT_CHARS: usize = 200;

/// Substrings that block a prompt outright. Matched against the lowercased prompt.
pub const SAFETY_KEYWORDS: &[&str] = &[
    "sexual", "minor", "hate", "illegal", "violence", "gore", "nude", "explicit",
];

/// Validates prompt lengths and runs the keyword safety filter.
pub fn check_prompt(prompt: &str, negative_prompt: Option<&str>) -> Result<(), AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("Prompt is required.".to_string()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters."
        )));
    }
    if negative_prompt.is_some_and(|n| n.chars().count() > MAX_NEGATIVE_PROMPT_CHARS) {
        return Err(AppError::Validation(format!(
            "Negative prompt must be at most {MAX_NEGATIVE_PROMPT_CHARS} characters."
        )));
    }

    let lower = prompt.to_lowercase();
    if let Some(keyword) = SAFETY_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        tracing::warn!("Prompt blocked by safety filter (matched {keyword:?})");
        return Err(AppError::Validation(
            "Prohibited prompt content detected.".to_string(),
        ));
    }

    Ok(())
}
