//! Inbound image validation.
//!
//! Payloads are either bare base64 or a `data:image/<subtype>;base64,<data>`
//! URI. Validation is structural only: the content is never decoded as an
//! image, so an empty or corrupt picture still passes and is left for the
//! upstream API to reject.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use thiserror::Error;

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const IMAGE_MIME_PREFIX: &str = "image/";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Standard alphabet, canonical padding, tolerant of non-zero trailing bits.
const STRUCTURAL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidImage {
    #[error("Image is required")]
    Missing,

    #[error("Invalid base64 format")]
    Base64,

    #[error("Image must be a data:image/ URI")]
    MissingDataUri,

    #[error("Unsupported data URI: expected data:image/<type>;base64,<data>")]
    MalformedDataUri,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject bare base64 without the `data:image/` prefix.
    pub require_data_uri: bool,
}

/// A validated image, ready to be sent upstream as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Bare base64 body, without any data-URI prefix.
    pub data: String,
}

impl ImagePayload {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Split a data URI into its MIME type and base64 body.
fn split_data_uri(rest: &str) -> Result<(&str, &str), InvalidImage> {
    let (mime_type, data) = rest
        .split_once(BASE64_MARKER)
        .ok_or(InvalidImage::MalformedDataUri)?;

    let subtype = mime_type
        .strip_prefix(IMAGE_MIME_PREFIX)
        .ok_or(InvalidImage::MalformedDataUri)?;
    if subtype.is_empty() || subtype.contains(char::is_whitespace) {
        return Err(InvalidImage::MalformedDataUri);
    }

    Ok((mime_type, data))
}

fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Validate `payload` and extract the MIME type and base64 body.
pub fn parse_image(payload: &str, options: ValidationOptions) -> Result<ImagePayload, InvalidImage> {
    if payload.is_empty() {
        return Err(InvalidImage::Missing);
    }

    let (declared_mime, data) = match payload.strip_prefix(DATA_URI_SCHEME) {
        Some(rest) => {
            let (mime_type, data) = split_data_uri(rest)?;
            (Some(mime_type), data)
        }
        None if options.require_data_uri => return Err(InvalidImage::MissingDataUri),
        None => (None, payload),
    };

    let bytes = STRUCTURAL_BASE64
        .decode(data)
        .map_err(|_| InvalidImage::Base64)?;

    let mime_type = declared_mime
        .map(str::to_string)
        .unwrap_or_else(|| sniff_mime_type(&bytes).to_string());

    Ok(ImagePayload {
        mime_type,
        data: data.to_string(),
    })
}

/// Pure predicate over [`parse_image`].
pub fn validate(payload: &str, options: ValidationOptions) -> bool {
    parse_image(payload, options).is_ok()
}
