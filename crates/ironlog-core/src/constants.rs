// ABOUTME: Application-wide constants for pagination, ordering retries, and identity
// ABOUTME: Single source for limits shared by the core crate and the server crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

/// Pagination limits
pub mod pagination {
    /// Page used when the client omits `page`
    pub const DEFAULT_PAGE: i64 = 1;
    /// Page size used when the client omits `pageSize`
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    /// Largest accepted `pageSize`
    pub const MAX_PAGE_SIZE: i64 = 100;
}

/// Ordered-collection transaction tuning
pub mod ordering {
    /// Attempts made for a position-changing transaction before reporting a conflict
    pub const MAX_ATTEMPTS: u32 = 8;
    /// Backoff step between attempts, multiplied by the attempt number
    pub const BACKOFF_STEP_MS: u64 = 15;
}

/// Session snapshot document
pub mod snapshot {
    /// Schema version written into every new snapshot
    pub const SCHEMA_VERSION: u32 = 1;
}

/// Identity provider defaults
pub mod identity {
    /// Default interval between scheduled JWKS refreshes (24 hours)
    pub const DEFAULT_JWKS_REFRESH_SECS: u64 = 86_400;
    /// Minimum gap between refreshes triggered by an unknown key id
    pub const MIN_FORCED_REFRESH_SECS: i64 = 60;
    /// Path appended to the issuer to locate the key set
    pub const JWKS_WELL_KNOWN_PATH: &str = "/.well-known/jwks.json";
}

/// Service identity used in logs
pub mod service_names {
    /// Name reported by the HTTP server
    pub const IRONLOG_SERVER: &str = "ironlog-server";
}
