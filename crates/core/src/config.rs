//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into gateways and stores. Binaries read environment variables exactly once and hand
//! the values to the parsing helpers below; nothing in the core reads the environment while
//! handling events.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_DATE_LABEL_FORMAT, DEFAULT_DISPATCH_QUEUE_CAPACITY, STORE_FILENAME,
    STORE_TMP_FILENAME,
};
use crate::{AdherenceError, AdherenceResult};
use chrono::format::{Item, StrftimeItems};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    date_label_format: String,
    dispatch_queue_capacity: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `AdherenceError::InvalidInput` if the date format contains an unknown
    /// specifier or the queue capacity is zero.
    pub fn new(
        data_dir: PathBuf,
        date_label_format: String,
        dispatch_queue_capacity: usize,
    ) -> AdherenceResult<Self> {
        validate_date_label_format(&date_label_format)?;

        if dispatch_queue_capacity == 0 {
            return Err(AdherenceError::InvalidInput(
                "dispatch queue capacity must be at least 1".into(),
            ));
        }

        Ok(Self {
            data_dir,
            date_label_format,
            dispatch_queue_capacity,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join(STORE_FILENAME)
    }

    pub fn store_tmp_file(&self) -> PathBuf {
        self.data_dir.join(STORE_TMP_FILENAME)
    }

    pub fn date_label_format(&self) -> &str {
        &self.date_label_format
    }

    pub fn dispatch_queue_capacity(&self) -> usize {
        self.dispatch_queue_capacity
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            date_label_format: DEFAULT_DATE_LABEL_FORMAT.into(),
            dispatch_queue_capacity: DEFAULT_DISPATCH_QUEUE_CAPACITY,
        }
    }
}

/// Reject strftime patterns chrono cannot render.
///
/// chrono only reports a bad specifier when the formatted value is displayed, which would
/// panic inside `to_string()`. Checking up front keeps that failure at startup.
pub fn validate_date_label_format(format: &str) -> AdherenceResult<()> {
    if format.trim().is_empty() {
        return Err(AdherenceError::InvalidInput(
            "date label format cannot be empty".into(),
        ));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(AdherenceError::InvalidInput(format!(
            "date label format '{}' contains an unsupported specifier",
            format
        )));
    }

    Ok(())
}

/// Resolve the data directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Resolve the date label format from an optional string value.
///
/// Empty values fall back to [`DEFAULT_DATE_LABEL_FORMAT`]; validation happens in
/// [`CoreConfig::new`].
pub fn date_label_format_from_env_value(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATE_LABEL_FORMAT.into())
}

/// Parse the dispatch queue capacity from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DISPATCH_QUEUE_CAPACITY`].
pub fn dispatch_queue_capacity_from_env_value(value: Option<String>) -> AdherenceResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_DISPATCH_QUEUE_CAPACITY),
        Some(v) => v.parse::<usize>().map_err(|_| {
            AdherenceError::InvalidInput(format!(
                "dispatch queue capacity must be a positive integer, got: '{}'",
                v
            ))
        }),
    }
}
