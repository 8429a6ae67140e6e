//! Constants used throughout the adherence core crate.
//!
//! Defaults for configuration values and the on-disk names used by the JSON-file gateway.

/// Default directory for the local store when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "adherence_data";

/// Filename of the JSON document written by the file-backed gateway.
pub const STORE_FILENAME: &str = "adherence.json";

/// Temporary filename used while replacing the store document.
pub const STORE_TMP_FILENAME: &str = "adherence.json.tmp";

/// Default strftime pattern for the dashboard date label (e.g. "Mon, Jan 1").
pub const DEFAULT_DATE_LABEL_FORMAT: &str = "%a, %b %-d";

/// Default number of events that may wait in a store's dispatch queue.
pub const DEFAULT_DISPATCH_QUEUE_CAPACITY: usize = 64;

/// Length in bytes of the random salt mixed into password digests.
pub const PASSWORD_SALT_LEN: usize = 16;

/// Error message shown on the login screen for unknown credentials.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
