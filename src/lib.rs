//! HTTP relay in front of the Gemini generative-AI API
//!
//! Exposes chat and multi-modal generation endpoints, validates and translates
//! request bodies into Gemini `generateContent` calls, and reshapes the
//! results into a fixed response envelope.

pub mod ai;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod server;
pub mod translate;

pub use error::{Error, Result};
