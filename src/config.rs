// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup and carried inside `AppState`, so handlers never
//! read the process environment themselves.

use reqwest::Url;
use std::env;

/// Default storage bucket for course covers and lesson content.
pub const DEFAULT_STORAGE_BUCKET: &str = "images";

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Supabase project URL (REST, RPC and Storage live under it)
    pub supabase_url: Url,
    /// Storage bucket that receives uploads
    pub storage_bucket: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    // --- Secrets ---
    /// Supabase service-role key, sent as `apikey` and bearer credential
    pub supabase_service_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let raw_url = env::var("SUPABASE_URL")
            .or_else(|_| env::var("VITE_SUPABASE_URL"))
            .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?;

        Ok(Self {
            supabase_url: parse_base_url(raw_url.trim())?,
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| DEFAULT_STORAGE_BUCKET.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),

            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
        })
    }

    /// Config for tests, pointing at the given backend URL.
    pub fn test_default(supabase_url: &str) -> Self {
        Self {
            supabase_url: parse_base_url(supabase_url).expect("test backend URL must be valid"),
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            supabase_service_key: "test_service_key".to_string(),
        }
    }

    /// Supabase URL without a trailing slash, for building endpoint paths.
    pub fn supabase_base(&self) -> &str {
        self.supabase_url.as_str().trim_end_matches('/')
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid("SUPABASE_URL", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid(
            "SUPABASE_URL",
            format!("unsupported scheme '{}'", other),
        )),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
