//! Orchestration of the record store, the durable store and the summary.
//!
//! Every mutation goes through the [`RecordStore`]; the events it emits are
//! drained right away and turned into one durable write plus one summary
//! recompute. Durable failures never abort the in-memory change but are
//! reported back as [`Persistence::Skipped`].

use std::path::Path;
use std::sync::mpsc::Receiver;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::roster::tally::aggregate::{self, recompute};
use crate::roster::tally::config::{SchemaProvider, SyncSettings};
use crate::roster::tally::error::{Result, SyncError};
use crate::roster::tally::io::excel_read;
use crate::roster::tally::io::excel_write::{self, SheetTable};
use crate::roster::tally::model::{
    DeleteSummary, IDENTITY_ROLE, ImportSummary, LoadReport, PersistedEntry, Persistence, Record,
    RecordId, RegionStat, decode_payload, encode_payload,
};
use crate::roster::tally::persistence::SqliteBridge;
use crate::roster::tally::store::{RecordStore, StoreEvent};

/// Sheet name used for the summary export.
pub const STATS_SHEET: &str = "Summary";

/// Lifecycle of a [`SyncEngine`]. There is no shutdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Loaded,
}

pub struct SyncEngine<S: SchemaProvider> {
    schema: S,
    settings: SyncSettings,
    store: RecordStore,
    events: Receiver<StoreEvent>,
    stats: Vec<RegionStat>,
    state: EngineState,
}

impl<S: SchemaProvider> SyncEngine<S> {
    pub fn new(schema: S, settings: SyncSettings) -> Self {
        let mut store = RecordStore::new();
        let events = store.subscribe();
        Self {
            schema,
            settings,
            store,
            events,
            stats: Vec::new(),
            state: EngineState::Uninitialized,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Loads the persisted collection into memory and computes the summary.
    ///
    /// Undecodable payloads are skipped. When the durable store cannot be
    /// read the engine starts empty and the report says so.
    #[instrument(
        level = "info",
        skip_all,
        fields(store = %self.settings.store_path.display(), namespace = %self.settings.namespace)
    )]
    pub fn start(&mut self) -> LoadReport {
        let (entries, persistence) = match self.read_persisted() {
            Ok(entries) => (entries, Persistence::Persisted),
            Err(err) => {
                error!(error = %err, "durable store unavailable; starting empty");
                (
                    Vec::new(),
                    Persistence::Skipped {
                        reason: err.to_string(),
                    },
                )
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in entries {
            match decode_payload(&entry.id, &entry.payload) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(id = %entry.id, error = %err, "skipping undecodable record");
                    skipped += 1;
                }
            }
        }

        self.store.load(records);
        self.state = EngineState::Loaded;
        self.refresh_stats();
        info!(
            loaded = self.store.len(),
            skipped, "records loaded from durable store"
        );
        LoadReport {
            loaded: self.store.len(),
            skipped,
            persistence,
        }
    }

    /// Reconciles spreadsheet rows against the store. The first row holds the
    /// column labels.
    ///
    /// Every non-blank label must resolve to a configured column, otherwise
    /// the import is rejected before any record is touched.
    #[instrument(level = "info", skip_all, fields(row_count = rows.len()))]
    pub fn import_rows(&mut self, rows: Vec<Vec<String>>) -> Result<ImportSummary> {
        self.ensure_loaded()?;
        let records = self.rows_to_records(rows)?;
        let counts = self.store.upsert_batch(records);
        let persistence = self.apply_events();
        info!(
            inserted = counts.inserted,
            updated = counts.updated,
            persisted = persistence.is_persisted(),
            "import applied"
        );
        Ok(ImportSummary {
            inserted: counts.inserted,
            updated: counts.updated,
            persistence,
        })
    }

    /// Imports the first worksheet of the workbook at `path`.
    #[instrument(level = "info", skip_all, fields(input = %path.display()))]
    pub fn import_workbook(&mut self, path: &Path) -> Result<ImportSummary> {
        if !path.exists() {
            return Err(SyncError::MissingInput(path.to_path_buf()));
        }
        let rows = excel_read::read_rows(path)?;
        self.import_rows(rows)
    }

    /// Removes records by identity; unknown identities are ignored.
    #[instrument(level = "info", skip_all, fields(id_count = ids.len()))]
    pub fn delete(&mut self, ids: &[RecordId]) -> Result<DeleteSummary> {
        self.ensure_loaded()?;
        let removed = self.store.remove_batch(ids);
        let persistence = self.apply_events();
        info!(
            removed = removed.len(),
            persisted = persistence.is_persisted(),
            "records deleted"
        );
        Ok(DeleteSummary {
            removed,
            persistence,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.store.get(id)
    }

    pub fn records(&self) -> &[Record] {
        self.store.all()
    }

    /// Identities in store order.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.store.ids()
    }

    /// Summary as of the last mutation.
    pub fn stats(&self) -> &[RegionStat] {
        &self.stats
    }

    /// Writes the requested records, in the given order, using the configured
    /// columns. Unknown identities are skipped. Returns the number of rows.
    #[instrument(level = "info", skip_all, fields(output = %path.display(), id_count = ids.len()))]
    pub fn export_workbook(&self, path: &Path, ids: &[RecordId]) -> Result<usize> {
        let columns = self.schema.columns();
        let rows: Vec<Vec<String>> = ids
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.value(&column.role))
                    .collect()
            })
            .collect();
        let table = SheetTable {
            sheet_name: self.schema.sheet_name().to_string(),
            columns: columns.iter().map(|column| column.name.clone()).collect(),
            widths: columns.iter().map(|column| column.xlsx_width).collect(),
            row_height: self.schema.row_height(),
            rows,
        };
        excel_write::write_table(path, &table)?;
        info!(row_count = table.rows.len(), "records exported");
        Ok(table.rows.len())
    }

    /// Writes an empty workbook carrying only the import headers.
    pub fn export_template(&self, path: &Path) -> Result<()> {
        self.export_workbook(path, &[]).map(|_| ())
    }

    /// Writes the current summary table.
    #[instrument(level = "info", skip_all, fields(output = %path.display()))]
    pub fn export_stats(&self, path: &Path) -> Result<()> {
        let columns = aggregate::stats_header(self.schema.categories());
        let widths = vec![self.schema.stats_column_width(); columns.len()];
        let rows = self
            .stats
            .iter()
            .map(|stat| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(stat.region.clone());
                row.extend(stat.counts.iter().map(|entry| entry.count.to_string()));
                row.push(stat.total.to_string());
                row
            })
            .collect();
        excel_write::write_table(
            path,
            &SheetTable {
                sheet_name: STATS_SHEET.to_string(),
                columns,
                widths,
                row_height: None,
                rows,
            },
        )
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            EngineState::Loaded => Ok(()),
            EngineState::Uninitialized => Err(SyncError::NotLoaded),
        }
    }

    fn rows_to_records(&self, rows: Vec<Vec<String>>) -> Result<Vec<Record>> {
        let mut rows = rows.into_iter();
        let headers = rows.next().ok_or(SyncError::EmptyImport)?;

        let mut roles: Vec<Option<String>> = Vec::with_capacity(headers.len());
        for header in &headers {
            let label = header.trim();
            if label.is_empty() {
                roles.push(None);
                continue;
            }
            let role = self.schema.role_for_label(label).ok_or_else(|| {
                SyncError::ImportFormat(format!("column '{label}' is not a configured column"))
            })?;
            roles.push(Some(role.to_string()));
        }
        if roles.iter().all(Option::is_none) {
            return Err(SyncError::ImportFormat(
                "no column matches the configuration".into(),
            ));
        }

        let mut records = Vec::new();
        for row in rows {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut record = Record::new(String::new());
            for (cell, role) in row.into_iter().zip(&roles) {
                let Some(role) = role else {
                    continue;
                };
                if role == IDENTITY_ROLE {
                    record.id = cell.trim().to_string();
                }
                record.set(role.clone(), cell);
            }
            if record.id.is_empty() {
                record.id = Uuid::new_v4().to_string();
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Forwards pending store events to the durable store and refreshes the
    /// summary once.
    fn apply_events(&mut self) -> Persistence {
        let mut persistence = Persistence::Persisted;
        while let Ok(event) = self.events.try_recv() {
            let result = match &event {
                StoreEvent::Upserted(records) => self.persist_upserted(records),
                StoreEvent::Removed(ids) => self.persist_removed(ids),
            };
            if let Err(err) = result {
                error!(error = %err, "change kept in memory only");
                persistence = Persistence::Skipped {
                    reason: err.to_string(),
                };
            }
        }
        self.refresh_stats();
        persistence
    }

    fn persist_upserted(&self, records: &[Record]) -> Result<()> {
        let entries = records
            .iter()
            .map(|record| {
                Ok(PersistedEntry {
                    id: record.id.clone(),
                    payload: encode_payload(record)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.open_bridge()?.upsert_batch(&entries)
    }

    fn persist_removed(&self, ids: &[RecordId]) -> Result<()> {
        self.open_bridge()?.delete_batch(ids)
    }

    fn read_persisted(&self) -> Result<Vec<PersistedEntry>> {
        self.open_bridge()?.select_all()
    }

    fn open_bridge(&self) -> Result<SqliteBridge> {
        let mut bridge = SqliteBridge::open(&self.settings.store_path)?;
        bridge.select_namespace(&self.settings.namespace)?;
        Ok(bridge)
    }

    fn refresh_stats(&mut self) {
        self.stats = recompute(
            self.store.all(),
            self.schema.regions(),
            self.schema.categories(),
        );
    }
}
