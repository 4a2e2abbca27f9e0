// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - clients for the managed backend.

pub mod auth_gateway;
pub mod storage;
pub mod supabase;

pub use auth_gateway::AuthGateway;
pub use storage::StorageClient;
pub use supabase::SupabaseClient;
