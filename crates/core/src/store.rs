use crate::{
    CategoryError, CategorySet, CompletionCommands, Location, RewardRecord, WorldContext,
    WorldResolver,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

/// In-memory state owned by a [`RewardStore`]: records keyed by location,
/// known categories and completion commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardTable {
    records: HashMap<Location, RewardRecord>,
    categories: CategorySet,
    completions: CompletionCommands,
}

impl RewardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record at its location. The record's
    /// category becomes known.
    pub fn insert(&mut self, record: RewardRecord) -> Option<RewardRecord> {
        self.categories.observe(record.category());
        self.records.insert(record.location().clone(), record)
    }

    pub fn remove(&mut self, location: &Location) -> Option<RewardRecord> {
        self.records.remove(location)
    }

    pub fn get(&self, location: &Location) -> Option<&RewardRecord> {
        self.records.get(location)
    }

    pub fn get_mut(&mut self, location: &Location) -> Option<&mut RewardRecord> {
        self.records.get_mut(location)
    }

    pub fn records(&self) -> impl Iterator<Item = &RewardRecord> + '_ {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut RewardRecord> + '_ {
        self.records.values_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by category then location, the order used on disk and
    /// in listings.
    pub fn sorted(&self) -> Vec<&RewardRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| {
            (a.category(), a.location()).cmp(&(b.category(), b.location()))
        });
        records
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategorySet {
        &mut self.categories
    }

    pub fn completions(&self) -> &CompletionCommands {
        &self.completions
    }

    pub fn completions_mut(&mut self) -> &mut CompletionCommands {
        &mut self.completions
    }

    fn clear_records(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }
}

/// Result of reading persisted state.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub table: RewardTable,
    /// Entries kept aside because no world context was available yet.
    pub deferred: usize,
    /// One line per entry that was skipped or degraded.
    pub warnings: Vec<String>,
}

/// What a loaded store reports back to its caller; the table itself stays in
/// the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub loaded: usize,
    pub deferred: usize,
    pub warnings: Vec<String>,
}

/// Durable backing for a [`RewardStore`].
///
/// `load` never fails outright: unreadable documents degrade to an empty
/// report with a warning, and bad entries are skipped individually.
pub trait Persistence: Send + Sync {
    fn load(&self, worlds: Option<&dyn WorldResolver>) -> LoadReport;

    fn save(&self, table: &RewardTable, worlds: Option<&dyn WorldResolver>)
        -> Result<(), PersistError>;

    /// Forget entries held back by a load without world context.
    fn discard_deferred(&self) {}
}

/// Keeps the last saved table in memory. Useful for tests and for hosts that
/// do not need durability.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Option<RewardTable>>,
    saves: Mutex<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(table: RewardTable) -> Self {
        Self {
            saved: Mutex::new(Some(table)),
            saves: Mutex::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn last_saved(&self) -> Option<RewardTable> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, _worlds: Option<&dyn WorldResolver>) -> LoadReport {
        LoadReport {
            table: self.last_saved().unwrap_or_default(),
            ..LoadReport::default()
        }
    }

    fn save(
        &self,
        table: &RewardTable,
        _worlds: Option<&dyn WorldResolver>,
    ) -> Result<(), PersistError> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(table.clone());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

impl<P: Persistence + ?Sized> Persistence for Arc<P> {
    fn load(&self, worlds: Option<&dyn WorldResolver>) -> LoadReport {
        (**self).load(worlds)
    }

    fn save(
        &self,
        table: &RewardTable,
        worlds: Option<&dyn WorldResolver>,
    ) -> Result<(), PersistError> {
        (**self).save(table, worlds)
    }

    fn discard_deferred(&self) {
        (**self).discard_deferred()
    }
}

/// Reward table guarded by a single reader/writer lock.
///
/// Every mutation persists while still holding the write lock, so writes
/// reach the backing store in the same order they hit the table, and a
/// failed save never rolls back memory.
pub struct RewardStore<P> {
    table: RwLock<RewardTable>,
    worlds: RwLock<Option<Arc<dyn WorldResolver>>>,
    persistence: P,
}

impl<P: Persistence> RewardStore<P> {
    /// Builds a store and performs the initial load. Without a resolver the
    /// persisted entries stay deferred until [`RewardStore::reload`].
    pub fn open(persistence: P, worlds: Option<Arc<dyn WorldResolver>>) -> Self {
        let store = Self {
            table: RwLock::new(RewardTable::new()),
            worlds: RwLock::new(None),
            persistence,
        };
        store.reload(worlds);
        store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Inserts or overwrites the record at its location and persists.
    pub fn add(&self, record: RewardRecord) {
        let mut table = self.write();
        table.insert(record);
        self.persist(&table);
    }

    /// Inserts `record` only when its location is free and persists in that
    /// case. Returns the record back when the location is taken.
    pub fn add_if_vacant(&self, record: RewardRecord) -> Result<(), RewardRecord> {
        let mut table = self.write();
        if table.get(record.location()).is_some() {
            return Err(record);
        }
        table.insert(record);
        self.persist(&table);
        Ok(())
    }

    /// Persists only when a record was present.
    pub fn remove(&self, location: &Location) -> Option<RewardRecord> {
        let mut table = self.write();
        let removed = table.remove(location);
        if removed.is_some() {
            self.persist(&table);
        }
        removed
    }

    pub fn get(&self, location: &Location) -> Option<RewardRecord> {
        self.read().get(location).cloned()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.read().get(location).is_some()
    }

    /// Copy of every record at call time. Later mutations are not reflected.
    pub fn list_all(&self) -> HashMap<Location, RewardRecord> {
        self.read()
            .records()
            .map(|record| (record.location().clone(), record.clone()))
            .collect()
    }

    /// Snapshot sorted by category then location.
    pub fn list_sorted(&self) -> Vec<RewardRecord> {
        self.read().sorted().into_iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Removes every record (and any deferred entries) and persists once.
    pub fn clear_all(&self) -> usize {
        let mut table = self.write();
        let count = table.clear_records();
        self.persistence.discard_deferred();
        self.persist(&table);
        count
    }

    /// Forces a write of the current table.
    pub fn mark_dirty(&self) {
        let table = self.write();
        self.persist(&table);
    }

    /// Applies `f` to the record at `location` under the write lock, making
    /// check-then-mutate sequences atomic per store. Does not persist; call
    /// [`RewardStore::mark_dirty`] after a change.
    pub fn modify<R>(&self, location: &Location, f: impl FnOnce(&mut RewardRecord) -> R) -> Option<R> {
        let mut table = self.write();
        table.get_mut(location).map(f)
    }

    /// Applies `f` to every record and returns how many reported a change.
    /// Does not persist.
    pub fn modify_all(&self, mut f: impl FnMut(&mut RewardRecord) -> bool) -> usize {
        let mut table = self.write();
        let mut changed = 0;
        for record in table.records_mut() {
            if f(record) {
                changed += 1;
            }
        }
        changed
    }

    /// Replaces the table with the persisted state. `worlds` becomes the
    /// resolver used for later saves.
    pub fn reload(&self, worlds: Option<Arc<dyn WorldResolver>>) -> ReloadSummary {
        let mut table = self.write();
        *self.worlds.write().unwrap_or_else(|e| e.into_inner()) = worlds.clone();
        let report = self.persistence.load(worlds.as_deref());
        for warning in &report.warnings {
            warn!(target: "glint::store", "{warning}");
        }
        if report.deferred > 0 {
            warn!(
                target: "glint::store",
                deferred = report.deferred,
                "entries deferred until world context is available"
            );
        }
        *table = report.table;
        info!(target: "glint::store", loaded = table.len(), "reward table loaded");
        ReloadSummary {
            loaded: table.len(),
            deferred: report.deferred,
            warnings: report.warnings,
        }
    }

    pub fn categories(&self) -> CategorySet {
        self.read().categories().clone()
    }

    /// Creates a category and persists when it is new.
    pub fn create_category(&self, name: &str) -> Result<bool, CategoryError> {
        let mut table = self.write();
        let created = table.categories_mut().create(name)?;
        if created {
            self.persist(&table);
        }
        Ok(created)
    }

    pub fn completions(&self) -> CompletionCommands {
        self.read().completions().clone()
    }

    /// Mutates completion commands and persists the result.
    pub fn modify_completions<R>(&self, f: impl FnOnce(&mut CompletionCommands) -> R) -> R {
        let mut table = self.write();
        let result = f(table.completions_mut());
        self.persist(&table);
        result
    }

    pub fn resolve_world(&self, world: &str) -> Option<WorldContext> {
        self.worlds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()?
            .resolve_world(world)
    }

    pub fn has_world_context(&self) -> bool {
        self.worlds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn persist(&self, table: &RewardTable) {
        let worlds = self
            .worlds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Err(err) = self.persistence.save(table, worlds.as_deref()) {
            error!(target: "glint::store", %err, "failed to save reward table");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RewardTable> {
        self.table.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RewardTable> {
        self.table.write().unwrap_or_else(|e| e.into_inner())
    }
}
