//! Fixed instruction prompt sent with every image.

/// Instructs the model to transcribe all visible text and to answer with the
/// no-text sentinel when there is none.
///
/// The sentinel literal here must match [`super::NO_TEXT_SENTINEL`].
pub const EXTRACTION_PROMPT: &str = r#"Extract all text visible in this image.
Return only the extracted text, preserving line breaks and reading order.
Do not add explanations, descriptions, translations, or formatting such as Markdown.
If the image contains no readable text, respond with exactly: NO_TEXT_DETECTED"#;
