// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access-token resolution through the `get_user_from_jwt` RPC.

use crate::error::AppError;
use crate::models::AuthUser;
use crate::services::supabase::SupabaseClient;
use reqwest::Method;
use serde::Deserialize;

const RESOLVE_USER_RPC: &str = "/rest/v1/rpc/get_user_from_jwt";

/// Resolves caller tokens to identities.
#[derive(Clone)]
pub struct AuthGateway {
    client: SupabaseClient,
}

/// Row shape returned by the RPC. A function returning a composite type with
/// no match yields all-null columns, hence the options.
#[derive(Deserialize)]
struct RpcUser {
    id: Option<String>,
    email: Option<String>,
}

/// The RPC answers with a bare object or a set, depending on how the function
/// was declared.
#[derive(Deserialize)]
#[serde(untagged)]
enum RpcResponse {
    Many(Vec<RpcUser>),
    One(Option<RpcUser>),
}

impl RpcResponse {
    fn into_user(self) -> Option<AuthUser> {
        let row = match self {
            RpcResponse::Many(rows) => rows.into_iter().next(),
            RpcResponse::One(row) => row,
        }?;

        let id = row.id.filter(|id| !id.is_empty())?;
        Some(AuthUser {
            id,
            email: row.email,
        })
    }
}

impl AuthGateway {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Resolve a token to the identity it was issued for.
    ///
    /// Gateway failures surface as `Unauthorized` with the gateway's message;
    /// a token that resolves to nothing is `Unauthorized("Invalid token")`.
    pub async fn resolve_user(&self, token: &str) -> Result<AuthUser, AppError> {
        let request = self
            .client
            .request(Method::POST, RESOLVE_USER_RPC)
            .json(&serde_json::json!({ "jwt": token }));

        let response: RpcResponse = self
            .client
            .send_json(request)
            .await
            .map_err(|e| match e {
                AppError::Upstream(msg) if !msg.is_empty() => AppError::Unauthorized(msg),
                internal @ AppError::Internal(_) => internal,
                _ => AppError::Unauthorized(AppError::INVALID_TOKEN.to_string()),
            })?;

        response
            .into_user()
            .ok_or_else(|| AppError::Unauthorized(AppError::INVALID_TOKEN.to_string()))
    }
}
