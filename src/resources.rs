// ABOUTME: Shared server state handed to every route handler
// ABOUTME: Database handle, authenticator, authorization service, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::sync::Arc;

use crate::authorization::AuthorizationService;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::identity::TokenVerifier;
use crate::middleware::ProfileAuthenticator;

/// Resources shared across requests
///
/// Built once at startup and shared through `Arc`; everything inside is
/// either immutable or internally synchronized.
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Bearer authentication and profile provisioning
    pub authenticator: ProfileAuthenticator,
    /// Ownership predicates
    pub authorization: AuthorizationService,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire the shared resources together
    #[must_use]
    pub fn new(database: Database, verifier: Arc<dyn TokenVerifier>, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        Self {
            authenticator: ProfileAuthenticator::new(verifier, Arc::clone(&database)),
            authorization: AuthorizationService::new(Arc::clone(&database)),
            database,
            config: Arc::new(config),
        }
    }
}
