//! Vision classifier: HTTP client and response parsing.

pub mod client;
pub mod response;

pub use client::{ClassifyError, GestureClient, GEMINI_API_KEY_ENV};
pub use response::{parse_label, strip_code_fence};
