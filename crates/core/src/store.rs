//! # Schedule Store
//!
//! The authoritative mapping of table id to schedule entries.
//!
//! State is published through a [`tokio::sync::watch`] channel as immutable
//! [`Timetables`] snapshots. Every write builds a complete new snapshot and
//! swaps it in under the channel's exclusive lock, so readers never observe a
//! partial update and all writers are funneled through one path.
//!
//! The store hands out two disjoint capabilities:
//!
//! - [`ScheduleReader`]: snapshot access and change notification
//! - [`ScheduleActions`]: the write operations; clones share one handle, so a
//!   component holding only actions is never woken by data changes

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{TimetableError, TimetableResult};
use crate::models::{DayLabel, ScheduleEntry, Table, TableId, TimeSlot};

/// Id of the table every new store is seeded with
pub const SEED_TABLE_ID: &str = "schedule-1";

/// Source of fresh table ids for duplication
pub trait TableIdGenerator: Send + Sync {
    fn next_id(&self) -> TableId;
}

/// Deterministic ids `schedule-2`, `schedule-3`, ...
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(2)
    }
}

impl TableIdGenerator for SequentialIds {
    fn next_id(&self) -> TableId {
        format!("schedule-{}", self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Random v4 UUID based ids
#[derive(Debug, Default)]
pub struct UuidIds;

impl TableIdGenerator for UuidIds {
    fn next_id(&self) -> TableId {
        format!("schedule-{}", Uuid::new_v4())
    }
}

/// An immutable snapshot of every table, in creation order.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetables {
    tables: Vec<Table>,
}

impl Timetables {
    pub fn new(tables: Vec<Table>) -> TimetableResult<Self> {
        if tables.is_empty() {
            return Err(TimetableError::Validation(
                "At least one table is required".to_string(),
            ));
        }
        for (i, table) in tables.iter().enumerate() {
            if tables[..i].iter().any(|other| other.id == table.id) {
                return Err(TimetableError::Validation(format!(
                    "Duplicate table id: {}",
                    table.id
                )));
            }
        }
        Ok(Self { tables })
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == table_id)
    }

    pub fn entries(&self, table_id: &str) -> Option<&[ScheduleEntry]> {
        self.table(table_id).map(Table::entries)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn position(&self, table_id: &str) -> TimetableResult<usize> {
        self.tables
            .iter()
            .position(|table| table.id == table_id)
            .ok_or_else(|| TimetableError::UnknownTable(table_id.to_string()))
    }

    /// A copy of this snapshot with the table at `index` replaced. Other
    /// tables keep sharing their entry storage.
    fn replacing(&self, index: usize, table: Table) -> Timetables {
        let mut tables = self.tables.clone();
        tables[index] = table;
        Timetables { tables }
    }

    fn with_entries_added(
        &self,
        table_id: &str,
        added: &[ScheduleEntry],
    ) -> TimetableResult<Timetables> {
        let index = self.position(table_id)?;
        let table = &self.tables[index];
        let mut entries = table.entries().to_vec();
        entries.extend_from_slice(added);
        Ok(self.replacing(index, table.with_entries(entries)))
    }

    fn without_entries_at(
        &self,
        table_id: &str,
        day: DayLabel,
        time: TimeSlot,
    ) -> TimetableResult<Option<Timetables>> {
        let index = self.position(table_id)?;
        let table = &self.tables[index];
        if !table.entries().iter().any(|entry| entry.occupies(day, time)) {
            return Ok(None);
        }
        let kept = table
            .entries()
            .iter()
            .filter(|entry| !entry.occupies(day, time))
            .cloned()
            .collect();
        Ok(Some(self.replacing(index, table.with_entries(kept))))
    }

    fn with_duplicate(&self, source_id: &str, new_id: TableId) -> TimetableResult<Timetables> {
        let source = &self.tables[self.position(source_id)?];
        if self.table(&new_id).is_some() {
            return Err(TimetableError::Validation(format!(
                "Generated table id already exists: {}",
                new_id
            )));
        }
        let mut tables = self.tables.clone();
        tables.push(Table::new(new_id, source.entries().to_vec()));
        Ok(Timetables { tables })
    }

    fn without_table(&self, table_id: &str) -> TimetableResult<Timetables> {
        let index = self.position(table_id)?;
        if self.tables.len() == 1 {
            return Err(TimetableError::LastTable);
        }
        let mut tables = self.tables.clone();
        tables.remove(index);
        Ok(Timetables { tables })
    }

    fn with_entry_moved(
        &self,
        table_id: &str,
        entry_index: usize,
        day: DayLabel,
        time_offset: i32,
    ) -> TimetableResult<Timetables> {
        let index = self.position(table_id)?;
        let table = &self.tables[index];
        let current = table.entries().get(entry_index).ok_or_else(|| {
            TimetableError::EntryIndexOutOfRange {
                table_id: table_id.to_string(),
                index: entry_index,
                len: table.entries().len(),
            }
        })?;
        let mut entries = table.entries().to_vec();
        entries[entry_index] = current.moved(day, time_offset)?;
        Ok(self.replacing(index, table.with_entries(entries)))
    }
}

struct StoreInner {
    state: watch::Sender<Arc<Timetables>>,
    ids: Box<dyn TableIdGenerator>,
}

impl StoreInner {
    /// Runs one write under the channel's exclusive lock.
    ///
    /// `op` returns `Ok(None)` when the write changes nothing; no snapshot is
    /// published in that case. On error the previous snapshot stays in place.
    fn apply<F>(&self, action: &str, op: F) -> TimetableResult<()>
    where
        F: FnOnce(&Timetables) -> TimetableResult<Option<Timetables>>,
    {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match op(&**state) {
            Ok(Some(next)) => {
                *state = Arc::new(next);
                true
            }
            Ok(None) => false,
            Err(err) => {
                outcome = Err(err);
                false
            }
        });

        match &outcome {
            Ok(()) => debug!("Applied {}", action),
            Err(err) => warn!("Rejected {}: {}", action, err),
        }
        outcome
    }
}

/// Owner of the timetable state
pub struct ScheduleStore {
    inner: Arc<StoreInner>,
}

impl ScheduleStore {
    /// A store seeded with one empty table, duplicating with sequential ids
    pub fn new() -> Self {
        Self::with_id_generator(SequentialIds::default())
    }

    pub fn with_id_generator(ids: impl TableIdGenerator + 'static) -> Self {
        let seed = Timetables {
            tables: vec![Table::empty(SEED_TABLE_ID)],
        };
        Self::from_timetables(seed, ids)
    }

    pub fn from_timetables(initial: Timetables, ids: impl TableIdGenerator + 'static) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            inner: Arc::new(StoreInner {
                state,
                ids: Box::new(ids),
            }),
        }
    }

    pub fn reader(&self) -> ScheduleReader {
        ScheduleReader {
            state: self.inner.state.subscribe(),
        }
    }

    pub fn actions(&self) -> ScheduleActions {
        ScheduleActions {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn snapshot(&self) -> Arc<Timetables> {
        Arc::clone(&self.inner.state.borrow())
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read capability: snapshots and change notification
#[derive(Debug, Clone)]
pub struct ScheduleReader {
    state: watch::Receiver<Arc<Timetables>>,
}

impl ScheduleReader {
    /// The current snapshot. It never changes; later writes publish new ones.
    pub fn snapshot(&self) -> Arc<Timetables> {
        Arc::clone(&self.state.borrow())
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `None` once the store and every action handle are dropped.
    pub async fn changed(&mut self) -> Option<Arc<Timetables>> {
        self.state.changed().await.ok()?;
        Some(Arc::clone(&self.state.borrow_and_update()))
    }

    /// A watcher that only wakes when `table_id`'s entries change
    pub fn subscribe_table(&self, table_id: impl Into<TableId>) -> TableWatcher {
        let mut state = self.state.clone();
        let table_id = table_id.into();
        let seen = state
            .borrow_and_update()
            .table(&table_id)
            .map(Table::shared_entries);
        TableWatcher {
            state,
            table_id,
            seen,
        }
    }
}

/// Change notification scoped to a single table
#[derive(Debug)]
pub struct TableWatcher {
    state: watch::Receiver<Arc<Timetables>>,
    table_id: TableId,
    seen: Option<Arc<Vec<ScheduleEntry>>>,
}

impl TableWatcher {
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Entries as of the last observed change
    pub fn current(&self) -> Option<Arc<Vec<ScheduleEntry>>> {
        self.seen.clone()
    }

    /// Waits until this table's entries differ from the last observed ones.
    ///
    /// Resolves to `Some(entries)` on change and `None` when the table is
    /// removed or the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<ScheduleEntry>>> {
        loop {
            self.state.changed().await.ok()?;
            let latest = self
                .state
                .borrow_and_update()
                .table(&self.table_id)
                .map(Table::shared_entries);
            let unchanged = match (&self.seen, &latest) {
                (Some(seen), Some(latest)) => Arc::ptr_eq(seen, latest),
                (None, None) => true,
                _ => false,
            };
            if !unchanged {
                self.seen = latest.clone();
                return latest;
            }
        }
    }
}

/// Write capability.
///
/// Every clone refers to the same store; [`ScheduleActions::same_store`]
/// lets holders compare handles without touching state.
#[derive(Clone)]
pub struct ScheduleActions {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for ScheduleActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleActions").finish_non_exhaustive()
    }
}

impl ScheduleActions {
    pub fn same_store(&self, other: &ScheduleActions) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Appends entries to a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if `table_id` does not exist.
    pub fn add_entries(&self, table_id: &str, entries: Vec<ScheduleEntry>) -> TimetableResult<()> {
        self.inner.apply("add_entries", |state| {
            state.with_entries_added(table_id, &entries).map(Some)
        })
    }

    /// Removes every entry on `day` whose range covers `time`.
    ///
    /// Nothing is published when no entry matches.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if `table_id` does not exist.
    pub fn remove_entry(&self, table_id: &str, day: DayLabel, time: TimeSlot) -> TimetableResult<()> {
        self.inner.apply("remove_entry", |state| {
            state.without_entries_at(table_id, day, time)
        })
    }

    /// Copies a table under a freshly generated id.
    ///
    /// # Returns
    ///
    /// * `TimetableResult<TableId>` - The id of the new table
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `source_id` does not exist (`UnknownTable`)
    /// - The generated id is already taken (`Validation`)
    pub fn duplicate_table(&self, source_id: &str) -> TimetableResult<TableId> {
        let mut created = None;
        self.inner.apply("duplicate_table", |state| {
            let new_id = self.inner.ids.next_id();
            let next = state.with_duplicate(source_id, new_id.clone())?;
            created = Some(new_id);
            Ok(Some(next))
        })?;
        created.ok_or_else(|| TimetableError::UnknownTable(source_id.to_string()))
    }

    /// Deletes a table.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `table_id` does not exist (`UnknownTable`)
    /// - It is the last remaining table (`LastTable`)
    pub fn remove_table(&self, table_id: &str) -> TimetableResult<()> {
        self.inner
            .apply("remove_table", |state| state.without_table(table_id).map(Some))
    }

    /// Moves one entry to `day` and shifts its slots by `time_offset`.
    ///
    /// Bounds and collisions are not checked here.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `table_id` does not exist (`UnknownTable`)
    /// - `entry_index` is out of range (`EntryIndexOutOfRange`)
    /// - The shifted range overflows (`Validation`)
    pub fn update_entry_position(
        &self,
        table_id: &str,
        entry_index: usize,
        day: DayLabel,
        time_offset: i32,
    ) -> TimetableResult<()> {
        self.inner.apply("update_entry_position", |state| {
            state
                .with_entry_moved(table_id, entry_index, day, time_offset)
                .map(Some)
        })
    }
}
