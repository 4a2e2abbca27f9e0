// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Course Publisher: upload backend for a course-publishing site
//!
//! Teachers upload lesson content and cover images; this crate checks the
//! caller owns the course, stores the asset in Supabase Storage and records
//! its public URL on the course or lesson row. It also provides the
//! observable state containers client code uses for session, user, profile
//! and notifications.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sanitize;
pub mod services;
pub mod stores;

use config::Config;
use db::PostgrestDb;
use services::{AuthGateway, StorageClient, SupabaseClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: PostgrestDb,
    pub auth: AuthGateway,
    pub storage: StorageClient,
}

impl AppState {
    /// Build all service clients from configuration.
    pub fn new(config: Config) -> Self {
        let client = SupabaseClient::new(&config);

        Self {
            db: PostgrestDb::new(client.clone()),
            auth: AuthGateway::new(client.clone()),
            storage: StorageClient::new(client, config.storage_bucket.clone()),
            config,
        }
    }
}
