//! Process configuration, read once at startup from the environment.

use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CHAT_MODEL: &str = "models/gemini-2.5-pro";
pub const DEFAULT_MULTIMODAL_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// How inline image parts are turned into upstream input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageDecoding {
    /// Forward the base64-decoded bytes with the caller's MIME type.
    #[default]
    Raw,
    /// Also decode the bytes as an image and reject unreadable ones.
    Verify,
}

impl FromStr for ImageDecoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ImageDecoding::Raw),
            "verify" => Ok(ImageDecoding::Verify),
            other => Err(Error::Config(format!(
                "Invalid IMAGE_DECODING '{}'. Expected 'raw' or 'verify'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub chat_model: String,
    pub multimodal_model: String,
    pub gemini_base_url: String,
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
    pub image_decoding: ImageDecoding,
    pub expose_error_traces: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            gemini_api_key: get("GEMINI_API_KEY")
                .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            chat_model: get("GEMINI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            multimodal_model: get("GEMINI_MULTIMODAL_MODEL")
                .unwrap_or_else(|| DEFAULT_MULTIMODAL_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            upstream_timeout: Duration::from_secs(parse_or(
                "UPSTREAM_TIMEOUT_SECS",
                get("UPSTREAM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_body_bytes: parse_or("MAX_BODY_BYTES", get("MAX_BODY_BYTES"), DEFAULT_MAX_BODY_BYTES)?,
            image_decoding: get("IMAGE_DECODING")
                .map(|v| v.parse::<ImageDecoding>())
                .transpose()?
                .unwrap_or_default(),
            expose_error_traces: get("EXPOSE_ERROR_TRACES")
                .map(|v| parse_bool("EXPOSE_ERROR_TRACES", &v))
                .transpose()?
                .unwrap_or(false),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {} '{}'", key, raw))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("Invalid {} '{}'", key, value))),
    }
}
