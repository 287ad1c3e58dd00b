use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crate::core::telemetry::{TelemetryError, TelemetryRecord};

/// Persistence for accepted videos. A video is stored whole or not at all.
///
/// Locations are keyed by timestamp and replaced on conflict; storing a
/// record name again marks it as imported again.
pub trait TelemetrySink {
    fn store_video(&mut self, record_name: &str, records: &[TelemetryRecord]) -> Result<(), TelemetryError>;
}

/// In-memory store: one location per timestamp plus the imported names.
#[derive(Debug, Default)]
pub struct MemorySink {
    locations: BTreeMap<i64, TelemetryRecord>,
    imported: BTreeSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `record_name` was imported.
    pub fn contains(&self, record_name: &str) -> bool {
        self.imported.contains(record_name)
    }

    pub fn location(&self, timestamp: i64) -> Option<&TelemetryRecord> {
        self.locations.get(&timestamp)
    }

    /// Every stored location, in timestamp order.
    pub fn locations(&self) -> impl Iterator<Item = &TelemetryRecord> {
        self.locations.values()
    }

    pub fn imported(&self) -> impl Iterator<Item = &str> {
        self.imported.iter().map(String::as_str)
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty() && self.locations.is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn store_video(&mut self, record_name: &str, records: &[TelemetryRecord]) -> Result<(), TelemetryError> {
        for record in records {
            self.locations.insert(record.timestamp, *record);
        }
        self.imported.insert(record_name.to_string());
        info!("💾 Stored {} with {} points", record_name, records.len());
        Ok(())
    }
}
