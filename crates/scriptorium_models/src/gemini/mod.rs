//! Google Gemini backend.

mod client;
mod dto;

pub use client::GeminiClient;
pub use dto::{GeminiContent, GeminiPart, GeminiRequest, GenerationConfig};
