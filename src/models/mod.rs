//! Data models for the upstream Google Gemini API.
//!
//! Only the subset of `generateContent` used to read a single label image is
//! modelled here: one user turn with a text part and an inline image part.

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;

pub use gemini::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
