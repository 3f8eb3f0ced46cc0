use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod payload;

pub use payload::{PAYLOAD_VERSION, decode_payload, encode_payload};

/// Identifier assigned to a record. It is either taken from the imported data
/// or generated when the source carries none.
pub type RecordId = String;

/// Semantic field name such as `region` or `identity`, independent of the
/// label shown in spreadsheets.
pub type Role = String;

/// Role whose value doubles as the record identity on import.
pub const IDENTITY_ROLE: &str = "identity";

/// Role holding the region a record belongs to.
pub const REGION_ROLE: &str = "region";

/// Scalar value stored under a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain text value. Every imported cell lands here.
    Text(String),
    /// Numeric value, typically written by earlier releases or other tools.
    Number(f64),
}

impl FieldValue {
    /// Returns the text form used for substring matching and exports.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Number(value) => value.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A uniquely identified business record. Once merged it only changes through
/// whole-record replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Record identity.
    pub id: RecordId,
    /// Role → value mapping.
    pub fields: BTreeMap<Role, FieldValue>,
}

impl Record {
    /// Creates an empty record with the provided identity.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style helper used when assembling records from rows.
    pub fn with_field(mut self, role: impl Into<Role>, value: impl Into<FieldValue>) -> Self {
        self.set(role, value);
        self
    }

    /// Inserts or replaces the value stored under `role`.
    pub fn set(&mut self, role: impl Into<Role>, value: impl Into<FieldValue>) {
        self.fields.insert(role.into(), value.into());
    }

    /// Text value for `role`, or an empty string when the role is absent.
    pub fn value(&self, role: &str) -> String {
        self.fields
            .get(role)
            .map(FieldValue::as_text)
            .unwrap_or_default()
    }
}

/// Row of the durable store: identity plus the encoded field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEntry {
    pub id: RecordId,
    pub payload: String,
}

/// Count of matching records for one category within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

/// Derived per-region summary. Never persisted; rebuilt on every recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionStat {
    pub region: String,
    pub counts: Vec<CategoryCount>,
    pub total: u64,
}

impl RegionStat {
    /// Count stored under the category display label, if the category exists.
    pub fn count(&self, label: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
    }
}

/// Counters returned by a batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

/// Whether a mutation reached the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// The change was committed to the durable store.
    Persisted,
    /// The change only exists in memory.
    Skipped { reason: String },
}

impl Persistence {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Persistence::Persisted)
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub persistence: Persistence,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Added: {}; Updated: {}", self.inserted, self.updated)
    }
}

/// Outcome of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Identities that were present and have been removed.
    pub removed: Vec<RecordId>,
    pub persistence: Persistence,
}

/// Outcome of the startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Persisted entries whose payload could not be decoded.
    pub skipped: usize,
    pub persistence: Persistence,
}
