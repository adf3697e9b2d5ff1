//! Per-node execution context handed to block handlers.

use carelink_core::types::DbId;
use carelink_db::models::emr::Emr;
use carelink_db::models::scan::Scan;
use serde_json::{Map, Value};

use crate::services::EngineServices;

/// Everything one block execution may look at.
///
/// The patient snapshot and scan list are loaded once per run by the
/// engine; handlers treat them as read-only. Anything that needs live
/// I/O (inference lookups, notification dispatch, insight generation)
/// goes through [`services`](Self::services).
pub struct BlockContext<'a> {
    pub emr: &'a Emr,
    pub scans: &'a [Scan],
    pub config: &'a Map<String, Value>,
    pub emr_id: DbId,
    /// Owning execution record, when the run is tracked.
    pub execution_id: Option<DbId>,
    pub services: &'a dyn EngineServices,
}

impl BlockContext<'_> {
    /// String config value, or `default` when absent or not a string.
    pub fn str_or<'b>(&'b self, key: &str, default: &'b str) -> &'b str {
        self.config.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Numeric config value, or `default` when absent or not a number.
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.config.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Boolean config value, or `default` when absent or not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.config.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// String-array config value, or `defaults` when absent.
    ///
    /// Non-string elements are ignored rather than failing the block.
    pub fn str_list_or(&self, key: &str, defaults: &[&str]) -> Vec<String> {
        match self.config.get(key).and_then(Value::as_array) {
            Some(values) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => defaults.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Comma-separated recipient list from a string config value.
    ///
    /// Entries are trimmed; empties are dropped. Absent key means no
    /// recipients.
    pub fn comma_list(&self, key: &str) -> Vec<String> {
        self.config
            .get(key)
            .and_then(Value::as_str)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::test_support::{ctx, StubServices};

    #[tokio::test]
    async fn config_accessors_fall_back_to_defaults() {
        let services = StubServices::default();
        let emr = crate::test_support::emr(1, "Jane Doe", Some(42));
        let config = serde_json::Map::new();
        let ctx = ctx(&emr, &[], &config, &services);

        assert_eq!(ctx.str_or("storage_type", "cloud"), "cloud");
        assert_eq!(ctx.f64_or("tax_rate", 10.0), 10.0);
        assert!(!ctx.bool_or("auto_report", false));
        assert_eq!(
            ctx.str_list_or("items", &["beds"]),
            vec!["beds".to_string()]
        );
        assert!(ctx.comma_list("email_recipients").is_empty());
    }

    #[tokio::test]
    async fn comma_list_trims_and_drops_empties() {
        let services = StubServices::default();
        let emr = crate::test_support::emr(1, "Jane Doe", Some(42));
        let mut config = serde_json::Map::new();
        config.insert(
            "email_recipients".to_string(),
            serde_json::json!(" a@h.test, ,b@h.test ,"),
        );
        let ctx = ctx(&emr, &[], &config, &services);

        assert_eq!(
            ctx.comma_list("email_recipients"),
            vec!["a@h.test".to_string(), "b@h.test".to_string()]
        );
    }
}
