//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, database, capsule).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Stored data failed authentication or the capsule belongs to someone else.
    pub const AUTH_FAILED: i32 = 5;

    /// Required configuration (the encryption secret) is missing.
    pub const CONFIG: i32 = 6;

    /// Capsule has not unlocked yet.
    pub const LOCKED: i32 = 7;

    /// Migration finished with failed records.
    pub const MIGRATION_INCOMPLETE: i32 = 8;
}

/// Default number of capsules checked by `inspect`.
pub const DEFAULT_INSPECT_LIMIT: usize = 5;
