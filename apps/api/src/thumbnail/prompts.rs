/// Suffix appended to every thumbnail prompt.
pub const QUALITY_SUFFIX: &str = "High quality, 4k, professional thumbnail background. No text.";

/// Builds the prompt sent upstream.
///
/// The style preset, when present, is appended as `, in {style} style`. A
/// negative prompt has no dedicated field in the images API, so it is
/// folded in as a trailing `Avoid:` sentence.
pub fn build_thumbnail_prompt(
    prompt: &str,
    style_preset: Option<&str>,
    negative_prompt: Option<&str>,
) -> String {
    let mut out = prompt.trim().to_string();

    if let Some(style) = style_preset.map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(&format!(", in {style} style"));
    }
    out.push_str(". ");
    out.push_str(QUALITY_SUFFIX);

    if let Some(negative) = negative_prompt.map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(&format!(" Avoid: {negative}."));
    }

    out
}
