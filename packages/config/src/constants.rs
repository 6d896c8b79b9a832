// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across sysconf

// Database Configuration
pub const SYSCONF_DATABASE_PATH: &str = "SYSCONF_DATABASE_PATH";
pub const SYSCONF_DB_MAX_CONNECTIONS: &str = "SYSCONF_DB_MAX_CONNECTIONS";
pub const SYSCONF_DB_BUSY_TIMEOUT_SECS: &str = "SYSCONF_DB_BUSY_TIMEOUT_SECS";
pub const SYSCONF_DB_ENABLE_WAL: &str = "SYSCONF_DB_ENABLE_WAL";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

// System Environment Variables
pub const HOME: &str = "HOME";
pub const USERPROFILE: &str = "USERPROFILE"; // Windows

/// Name of the per-user data directory under the home directory
pub const DATA_DIR_NAME: &str = ".sysconf";

/// File name of the settings database inside the data directory
pub const DATABASE_FILE_NAME: &str = "sysconf.db";
