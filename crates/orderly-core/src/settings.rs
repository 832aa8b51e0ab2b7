//! Settings for orderly projects.
//!
//! [`Settings`] holds the database connections, the ordered models that the
//! management commands operate on, and logging configuration. Every field
//! has a sensible default so a settings file only needs to name what differs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The default spacing between consecutive ordering keys.
pub const DEFAULT_ORDERING_GAP: i64 = 100;

/// Database connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine. Only `"sqlite"` ships with orderly.
    pub engine: String,
    /// The database name (a file path for `SQLite`, or `:memory:`).
    pub name: String,
    /// Additional engine-specific options.
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "sqlite".to_string(),
            name: "db.sqlite3".to_string(),
            options: HashMap::new(),
        }
    }
}

/// Declares one ordered model: the table holding its records and the fields
/// whose values partition it into independently ordered groups.
///
/// ```toml
/// [ordered_models.menu_item]
/// db_table = "menu_item"
/// order_within_fields = ["menu_id"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedModelSettings {
    /// The table name.
    pub db_table: String,
    /// The order-within fields. Empty means the whole table is one group.
    #[serde(default)]
    pub order_within_fields: Vec<String>,
    /// Per-model gap; falls back to [`Settings::ordering_gap`].
    #[serde(default)]
    pub gap: Option<i64>,
}

/// The complete set of project settings.
///
/// # Examples
///
/// ```
/// use orderly_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.ordering_gap, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (selects human-readable logs).
    pub debug: bool,

    // ── Database ─────────────────────────────────────────────────────

    /// Database configurations, keyed by alias (e.g. "default").
    pub databases: HashMap<String, DatabaseSettings>,

    // ── Ordering ─────────────────────────────────────────────────────

    /// Spacing used for fresh and rebalanced ordering keys.
    pub ordering_gap: i64,
    /// Ordered models, keyed by label.
    pub ordered_models: HashMap<String, OrderedModelSettings>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "orderly_db=debug").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let mut databases = HashMap::new();
        databases.insert("default".to_string(), DatabaseSettings::default());

        Self {
            debug: true,
            databases,
            ordering_gap: DEFAULT_ORDERING_GAP,
            ordered_models: HashMap::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns the database configuration registered under `alias`.
    pub fn database(&self, alias: &str) -> Option<&DatabaseSettings> {
        self.databases.get(alias)
    }

    /// Returns the ordered model registered under `label`.
    pub fn ordered_model(&self, label: &str) -> Option<&OrderedModelSettings> {
        self.ordered_models.get(label)
    }

    /// Returns the gap in effect for `model`.
    pub fn gap_for(&self, model: &OrderedModelSettings) -> i64 {
        model.gap.unwrap_or(self.ordering_gap)
    }
}
