//! snaptext: base64 image in, extracted text out.
//!
//! The HTTP surface lives in [`api`], the OCR pipeline (validation, upstream
//! call, retry, sentinel handling) in [`ocr`].

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
