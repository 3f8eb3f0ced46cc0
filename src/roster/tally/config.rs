use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::roster::tally::error::{Result, SyncError};

/// Default location of the record database, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/data.db3";
/// Default namespace holding the record collection.
pub const DEFAULT_NAMESPACE: &str = "records";

/// Column of the record table as described by the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Role the column is bound to.
    pub role: String,
    /// Display label, also the header expected on import.
    pub name: String,
    #[serde(default = "default_pixel_width")]
    pub pixel_width: u32,
    #[serde(default = "default_xlsx_width")]
    pub xlsx_width: f64,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub sortable: bool,
}

/// Category counted per region by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategorySpec {
    /// Role whose value is searched.
    pub role: String,
    /// Text that must occur in the role value.
    pub name: String,
    /// Optional label for the summary table; `name` is used when absent.
    #[serde(default)]
    pub label: Option<String>,
}

impl CategorySpec {
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Source of column-to-role mappings, regions and categories.
pub trait SchemaProvider {
    /// Resolves an import header (display label) to its role.
    fn role_for_label(&self, label: &str) -> Option<&str>;
    /// Columns of the record table in display order.
    fn columns(&self) -> &[ColumnDescriptor];
    /// Regions of the summary table in display order.
    fn regions(&self) -> &[String];
    /// Categories of the summary table in display order.
    fn categories(&self) -> &[CategorySpec];

    /// Worksheet name used when records are exported.
    fn sheet_name(&self) -> &str {
        "Records"
    }

    /// Height of exported record rows; `None` keeps the spreadsheet default.
    fn row_height(&self) -> Option<f64> {
        None
    }

    /// Width of the summary table columns.
    fn stats_column_width(&self) -> f64 {
        default_xlsx_width()
    }
}

/// Application configuration read from a JSON document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub item_columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub stats_columns: Vec<CategorySpec>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default = "default_row_height")]
    pub item_xlsx_height: f64,
    #[serde(default = "default_xlsx_width")]
    pub stats_col_width: f64,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

impl AppConfig {
    /// Reads and validates the configuration stored at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Parses and validates a configuration document.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.item_columns.is_empty() {
            return Err(SyncError::InvalidConfig("no item columns configured".into()));
        }
        let mut roles = HashSet::new();
        let mut names = HashSet::new();
        for column in &self.item_columns {
            if column.role.trim().is_empty() || column.name.trim().is_empty() {
                return Err(SyncError::InvalidConfig(
                    "item columns need a role and a name".into(),
                ));
            }
            if !roles.insert(column.role.as_str()) {
                return Err(SyncError::InvalidConfig(format!(
                    "duplicate role '{}'",
                    column.role
                )));
            }
            if !names.insert(column.name.as_str()) {
                return Err(SyncError::InvalidConfig(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(())
    }
}

impl SchemaProvider for AppConfig {
    fn role_for_label(&self, label: &str) -> Option<&str> {
        self.item_columns
            .iter()
            .find(|column| column.name == label)
            .map(|column| column.role.as_str())
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.item_columns
    }

    fn regions(&self) -> &[String] {
        &self.regions
    }

    fn categories(&self) -> &[CategorySpec] {
        &self.stats_columns
    }

    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn row_height(&self) -> Option<f64> {
        Some(self.item_xlsx_height)
    }

    fn stats_column_width(&self) -> f64 {
        self.stats_col_width
    }
}

/// Where the durable record collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub store_path: PathBuf,
    pub namespace: String,
}

impl SyncSettings {
    pub fn new(store_path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            store_path: store_path.into(),
            namespace: namespace.into(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH, DEFAULT_NAMESPACE)
    }
}

fn default_pixel_width() -> u32 {
    120
}

fn default_xlsx_width() -> f64 {
    12.0
}

fn default_row_height() -> f64 {
    20.0
}

fn default_sheet_name() -> String {
    "Records".to_string()
}
