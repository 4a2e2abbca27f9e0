// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared HTTP plumbing for the Supabase REST, RPC and Storage APIs.
//!
//! Every call authenticates with the service key, sent both as the `apikey`
//! header and as a bearer credential. Failures are reported as
//! `AppError::Upstream` carrying the service's own message.

use crate::config::Config;
use crate::error::AppError;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Low-level Supabase client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.supabase_base().to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start an authenticated request to `{base_url}{path}`.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Send a request and fail on non-success status.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AppError> {
        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                // Bad header value or URL: our configuration, not Supabase
                AppError::Internal(anyhow::Error::new(e).context("Failed to build Supabase request"))
            } else {
                AppError::Upstream(e.to_string())
            }
        })?;

        check_response(response).await
    }

    /// Send a request and parse the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AppError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed response: {}", e)))
    }
}

/// Error payloads across Supabase services. PostgREST and Storage both use
/// `message`; some Storage versions only fill `error`.
#[derive(Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<String>,
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "Supabase request failed");

    Err(AppError::Upstream(error_message(status, &body)))
}

/// Pull a human-readable message out of an error body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(msg) = payload.message.or(payload.error) {
            if !msg.is_empty() {
                return msg;
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}
