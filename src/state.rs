// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::auth::SessionKeys;
use crate::biz_number::BizNumberAllocator;
use crate::config::DEFAULT_CORS_ORIGINS;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionKeys>,
    pub allocator: Arc<BizNumberAllocator>,
    /// Browser origins allowed by the CORS layer.
    pub cors_origins: Arc<[HeaderValue]>,
}

impl AppState {
    pub fn new(db: Database, sessions: SessionKeys) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(sessions),
            allocator: Arc::new(BizNumberAllocator::new()),
            cors_origins: DEFAULT_CORS_ORIGINS
                .iter()
                .copied()
                .map(HeaderValue::from_static)
                .collect(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.cors_origins = origins.into();
        self
    }
}

/// State over a fresh database in a temporary directory. Keep the directory
/// alive for as long as the state is used.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let db = Database::open(&dir.path().join("test.redb")).expect("open db");
    let state = AppState::new(db, SessionKeys::from_secret(b"test-state-secret"));
    (state, dir)
}
