//! Default values for codevis configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Config Files
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "codevis.toml";

/// Directory under the user config dir holding `config.toml`.
pub const DEFAULT_CONFIG_DIR: &str = "codevis";

// ============================================================================
// Store Defaults
// ============================================================================

/// Default SurrealDB endpoint.
pub const DEFAULT_STORE_ADDRESS: &str = "ws://127.0.0.1:8000";

/// Default SurrealDB namespace.
pub const DEFAULT_STORE_NAMESPACE: &str = "codevis";

/// Default SurrealDB database.
pub const DEFAULT_STORE_DATABASE: &str = "graph";

// ============================================================================
// Analysis Defaults
// ============================================================================

/// Analyzer output directory.
pub const DEFAULT_ANALYSIS_DIR: &str = ".";

/// Facts document looked up inside the analysis directory.
pub const DEFAULT_FACTS_FILE: &str = "facts.json";

/// Program name used when the analysis directory has no base name.
pub const DEFAULT_PROGRAM_NAME: &str = "program";

// ============================================================================
// Sync Defaults
// ============================================================================

/// Throughput report interval (1 second).
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;
