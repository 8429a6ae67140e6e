//! Date label sources for dashboard snapshots.

use crate::config::CoreConfig;

/// Produces the "today" label stamped onto dashboard snapshots.
pub trait DateLabelSource: Send + Sync {
    fn today_label(&self) -> String;
}

/// Formats the local date with a strftime pattern.
///
/// The pattern is expected to have passed
/// [`validate_date_label_format`](crate::config::validate_date_label_format); building from a
/// [`CoreConfig`] guarantees that.
#[derive(Clone, Debug)]
pub struct SystemDateLabel {
    format: String,
}

impl SystemDateLabel {
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self {
            format: cfg.date_label_format().to_owned(),
        }
    }
}

impl DateLabelSource for SystemDateLabel {
    fn today_label(&self) -> String {
        chrono::Local::now().format(&self.format).to_string()
    }
}

/// Always returns the same label. Handy for deterministic renders.
#[derive(Clone, Debug)]
pub struct FixedDateLabel(pub String);

impl DateLabelSource for FixedDateLabel {
    fn today_label(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_system_label_uses_configured_format() {
        let cfg = CoreConfig::new(PathBuf::from("data"), "%Y".into(), 4).unwrap();
        let label = SystemDateLabel::from_config(&cfg).today_label();
        assert_eq!(label, chrono::Local::now().format("%Y").to_string());
    }

    #[test]
    fn test_fixed_label() {
        assert_eq!(FixedDateLabel("Mon, Jan 1".into()).today_label(), "Mon, Jan 1");
    }
}
