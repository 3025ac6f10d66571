use crate::codec::{decode_entry, read_document, write_document, DocumentShape, RawEntry};
use crate::config::StorageConfig;
use crate::payload::JsonPayloadCodec;
use glint_core::{
    CompletionCommands, LoadReport, PayloadCodec, PersistError, Persistence, RewardTable,
    WorldResolver,
};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

/// Reward table and completion commands as two pretty-printed JSON files.
///
/// Entries read while no world is loaded are held back unchanged and written
/// again on every save until a later load can materialize them.
pub struct JsonFilePersistence {
    rewards_path: PathBuf,
    completions_path: PathBuf,
    codec: Box<dyn PayloadCodec>,
    deferred: Mutex<Vec<RawEntry>>,
}

impl JsonFilePersistence {
    pub fn new(rewards_path: impl Into<PathBuf>, completions_path: impl Into<PathBuf>) -> Self {
        Self {
            rewards_path: rewards_path.into(),
            completions_path: completions_path.into(),
            codec: Box::new(JsonPayloadCodec),
            deferred: Mutex::new(Vec::new()),
        }
    }

    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self::new(storage.rewards_path(), storage.completions_path())
    }

    pub fn with_codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn rewards_path(&self) -> &Path {
        &self.rewards_path
    }

    pub fn completions_path(&self) -> &Path {
        &self.completions_path
    }

    /// Entries waiting for a world context.
    pub fn deferred(&self) -> usize {
        self.deferred_entries().len()
    }

    fn deferred_entries(&self) -> MutexGuard<'_, Vec<RawEntry>> {
        self.deferred.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_completions(&self, warnings: &mut Vec<String>) -> CompletionCommands {
        match read_json(&self.completions_path) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(commands) => commands,
                Err(err) => {
                    warnings.push(format!(
                        "ignoring {}: {err}",
                        self.completions_path.display()
                    ));
                    CompletionCommands::default()
                }
            },
            Ok(None) => CompletionCommands::default(),
            Err(message) => {
                error!(target: "glint::data", "{message}");
                warnings.push(message);
                CompletionCommands::default()
            }
        }
    }
}

/// `Ok(None)` when the file does not exist yet.
fn read_json(path: &Path) -> Result<Option<Value>, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("failed to read {}: {err}", path.display())),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))
}

/// Writes through a sibling temp file so a crash never leaves half a document.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(value)
        .map_err(|err| PersistError::Serialize(err.to_string()))?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl Persistence for JsonFilePersistence {
    fn load(&self, worlds: Option<&dyn WorldResolver>) -> LoadReport {
        let mut report = LoadReport::default();
        let completions = self.load_completions(&mut report.warnings);
        let document = match read_json(&self.rewards_path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!(
                    target: "glint::data",
                    path = %self.rewards_path.display(),
                    "no reward file yet"
                );
                self.deferred_entries().clear();
                *report.table.completions_mut() = completions;
                return report;
            }
            Err(message) => {
                error!(target: "glint::data", "{message}");
                report.warnings.push(message);
                self.deferred_entries().clear();
                *report.table.completions_mut() = completions;
                return report;
            }
        };

        let doc = read_document(document);
        report.warnings.extend(doc.warnings);
        if doc.shape != DocumentShape::Nested {
            info!(
                target: "glint::data",
                shape = ?doc.shape,
                "legacy reward document, next save rewrites it nested by category"
            );
        }
        let mut table = RewardTable::new();
        for name in &doc.categories {
            if let Err(err) = table.categories_mut().create(name) {
                report.warnings.push(err.to_string());
            }
        }
        *table.completions_mut() = completions;

        let mut deferred = self.deferred_entries();
        deferred.clear();
        match worlds {
            None => {
                report.deferred = doc.entries.len();
                deferred.extend(doc.entries);
            }
            Some(worlds) => {
                for entry in &doc.entries {
                    match decode_entry(entry, worlds, self.codec.as_ref()) {
                        Ok(record) => {
                            table.insert(record);
                        }
                        Err(warning) => report.warnings.push(warning),
                    }
                }
            }
        }
        debug!(
            target: "glint::data",
            loaded = table.len(),
            deferred = report.deferred,
            skipped = report.warnings.len(),
            "reward document read"
        );
        report.table = table;
        report
    }

    fn save(
        &self,
        table: &RewardTable,
        worlds: Option<&dyn WorldResolver>,
    ) -> Result<(), PersistError> {
        let document = {
            let deferred = self.deferred_entries();
            write_document(table, &deferred, worlds, self.codec.as_ref())
                .map_err(|err| PersistError::Serialize(err.to_string()))?
        };
        write_json(&self.rewards_path, &document)?;
        write_json(&self.completions_path, table.completions())?;
        Ok(())
    }

    fn discard_deferred(&self) {
        self.deferred_entries().clear();
    }
}
