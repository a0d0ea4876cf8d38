//! Generic table engine.
//!
//! [`Table`] owns the records, the columns, the row selection and the sort
//! state. It is a cheap handle: clones share the same state, which lets the
//! completion callbacks of an edit workflow reach the table after the call
//! that started them has returned.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use log::{debug, warn};

use crate::color::Color;
use crate::column::Column;
use crate::error::{TableError, ValidationResult};
use crate::field::validate_record;
use crate::selection::{SelectionDelta, SelectionSet};

/// Produces a blank record for the "add" workflow.
pub type NewItem<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Current sort state.
///
/// `ascending` is the direction of the last sort on `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    /// Active sort column, if any sort happened.
    pub column: Option<usize>,
    /// Direction of the last sort.
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

impl SortState {
    /// Direction the next sort on `column` will use.
    ///
    /// A new column starts ascending, the active column flips.
    pub fn next_direction(&self, column: usize) -> bool {
        match self.column {
            Some(active) if active == column => !self.ascending,
            _ => true,
        }
    }
}

/// Internal state for the table.
pub(crate) struct TableInner<T> {
    /// Column definitions, fixed after construction.
    columns: Vec<Column<T>>,
    /// The records, in display order.
    rows: Vec<T>,
    /// Selected row indices.
    selection: SelectionSet,
    sort: SortState,
    new_item: NewItem<T>,
}

/// A sortable, multi-select table of records.
///
/// # Examples
///
/// ```
/// use tablekit::{Column, FieldDescriptor, Table};
///
/// let table = Table::new(
///     vec![Column::new(FieldDescriptor::new("Word", |w: &String| w.clone()), 20)],
///     String::new,
/// );
/// table.set_data(vec!["pear".into(), "apple".into(), "fig".into()]);
///
/// table.sort_by(0);
/// assert_eq!(table.data(), vec!["apple", "fig", "pear"]);
///
/// table.sort_by(0);
/// assert_eq!(table.data(), vec!["pear", "fig", "apple"]);
/// ```
pub struct Table<T> {
    inner: Arc<RwLock<TableInner<T>>>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<T> std::fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Table");
        if let Ok(guard) = self.inner.read() {
            s.field("columns", &guard.columns.len())
                .field("rows", &guard.rows.len())
                .field("selection", &guard.selection)
                .field("sort", &guard.sort);
        }
        s.field("dirty", &self.dirty.load(Ordering::SeqCst)).finish()
    }
}

impl<T: Clone + 'static> Table<T> {
    /// Create an empty table.
    ///
    /// # Arguments
    /// * `columns` - Column definitions, fixed for the table's lifetime
    /// * `new_item` - Factory for blank records used by "add"
    pub fn new(columns: Vec<Column<T>>, new_item: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TableInner {
                columns,
                rows: Vec::new(),
                selection: SelectionSet::new(),
                sort: SortState::default(),
                new_item: Arc::new(new_item),
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TableInner<T>>, TableError> {
        self.inner.write().map_err(|_| TableError::Poisoned)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Column access
    // -------------------------------------------------------------------------

    /// Get the column definitions.
    pub fn columns(&self) -> Vec<Column<T>> {
        self.inner
            .read()
            .map(|g| g.columns.clone())
            .unwrap_or_default()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.inner.read().map(|g| g.columns.len()).unwrap_or(0)
    }

    /// Header label of a column.
    pub fn header(&self, column: usize) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.columns.get(column).map(|c| c.label().to_string()))
    }

    // -------------------------------------------------------------------------
    // Row access
    // -------------------------------------------------------------------------

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.rows.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Option<T> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.rows.get(index).cloned())
    }

    /// Snapshot of all rows.
    pub fn data(&self) -> Vec<T> {
        self.inner
            .read()
            .map(|g| g.rows.clone())
            .unwrap_or_default()
    }

    /// Borrow the live rows without copying.
    ///
    /// The closure must not call back into this table.
    pub fn with_data<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard.rows),
            Err(_) => f(&[]),
        }
    }

    /// Display text of one cell.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.inner.read().ok().and_then(|g| {
            let record = g.rows.get(row)?;
            Some(g.columns.get(column)?.string_value_for(record))
        })
    }

    /// Marker color of one cell. `None` unless the column is an icon column.
    pub fn cell_color(&self, row: usize, column: usize) -> Option<Color> {
        self.inner.read().ok().and_then(|g| {
            let record = g.rows.get(row)?;
            g.columns.get(column)?.color_for(record)
        })
    }

    /// Create a blank record with the table's factory.
    pub fn new_item(&self) -> Option<T> {
        let factory = self.inner.read().ok().map(|g| Arc::clone(&g.new_item))?;
        Some(factory())
    }

    /// Run every field validator against a record.
    pub fn validate(&self, record: &T) -> ValidationResult {
        self.inner
            .read()
            .map(|g| validate_record(g.columns.iter().map(Column::field), record))
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Row mutation
    // -------------------------------------------------------------------------

    /// Replace all rows. Clears the selection.
    pub fn set_data(&self, rows: Vec<T>) {
        if let Ok(mut guard) = self.inner.write() {
            debug!("set_data: {} rows replace {}", rows.len(), guard.rows.len());
            guard.rows = rows;
            guard.selection.clear();
            self.mark_dirty();
        }
    }

    /// Append a row.
    ///
    /// Neither the selection nor the sort state changes, and the table is
    /// not re-sorted: the row stays last until the next `sort_by`.
    pub fn add_item(&self, record: T) {
        if let Ok(mut guard) = self.inner.write() {
            guard.rows.push(record);
            debug!("add_item: now {} rows", guard.rows.len());
            self.mark_dirty();
        }
    }

    /// Replace the row at `index`. Returns the previous record.
    pub fn item_edited(&self, index: usize, record: T) -> Result<T, TableError> {
        let mut guard = self.write()?;
        let len = guard.rows.len();
        let slot = guard.rows.get_mut(index).ok_or_else(|| {
            warn!("item_edited: index {index} out of range (len {len})");
            TableError::index(index, len)
        })?;
        let previous = std::mem::replace(slot, record);
        self.mark_dirty();
        Ok(previous)
    }

    /// Remove every selected row, keeping the others in order.
    ///
    /// Clears the selection. Returns the number of rows removed; 0 when
    /// nothing was selected.
    pub fn delete_selected(&self) -> usize {
        let Ok(mut guard) = self.inner.write() else {
            return 0;
        };
        if guard.selection.is_empty() {
            return 0;
        }

        let inner = &mut *guard;
        let before = inner.rows.len();
        let mut index = 0;
        inner.rows.retain(|_| {
            let keep = !inner.selection.contains(index);
            index += 1;
            keep
        });
        inner.selection.clear();

        let deleted = before - inner.rows.len();
        debug!("delete_selected: removed {deleted} of {before} rows");
        self.mark_dirty();
        deleted
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    fn with_valid_row<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut SelectionSet) -> R,
    ) -> Result<R, TableError> {
        let mut guard = self.write()?;
        let len = guard.rows.len();
        if index >= len {
            warn!("selection: index {index} out of range (len {len})");
            return Err(TableError::index(index, len));
        }
        let result = f(&mut guard.selection);
        self.mark_dirty();
        Ok(result)
    }

    /// Select a row, keeping the rest of the selection.
    /// Returns true if the row was not selected before.
    pub fn select(&self, index: usize) -> Result<bool, TableError> {
        self.with_valid_row(index, |s| s.add(index))
    }

    /// Deselect a row. Returns true if it was selected.
    pub fn deselect(&self, index: usize) -> Result<bool, TableError> {
        self.with_valid_row(index, |s| s.remove(index))
    }

    /// Toggle selection of a row.
    pub fn toggle_select(&self, index: usize) -> Result<SelectionDelta, TableError> {
        self.with_valid_row(index, |s| s.toggle(index))
    }

    /// Select exactly one row, clearing the rest.
    pub fn select_only(&self, index: usize) -> Result<SelectionDelta, TableError> {
        self.with_valid_row(index, |s| s.select_only(index))
    }

    /// Select every row.
    pub fn select_all(&self) {
        if let Ok(mut guard) = self.inner.write() {
            let len = guard.rows.len();
            guard.selection = (0..len).collect();
            self.mark_dirty();
        }
    }

    /// Clear all selection.
    /// Returns the rows that were deselected.
    pub fn deselect_all(&self) -> Vec<usize> {
        if let Ok(mut guard) = self.inner.write() {
            let removed = guard.selection.clear();
            self.mark_dirty();
            return removed;
        }
        vec![]
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.inner
            .read()
            .map(|g| g.selection.contains(index))
            .unwrap_or(false)
    }

    pub fn selected_count(&self) -> usize {
        self.inner.read().map(|g| g.selection.len()).unwrap_or(0)
    }

    /// Selected row indices, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.inner
            .read()
            .map(|g| g.selection.iter().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the selected records keyed by row index.
    pub fn selected_items(&self) -> BTreeMap<usize, T> {
        self.inner
            .read()
            .map(|g| {
                g.selection
                    .iter()
                    .filter_map(|i| g.rows.get(i).map(|row| (i, row.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The selected record with the lowest index.
    pub fn first_selected(&self) -> Option<(usize, T)> {
        self.inner.read().ok().and_then(|g| {
            let index = g.selection.first()?;
            g.rows.get(index).map(|row| (index, row.clone()))
        })
    }

    /// Selected records as text, for clipboard export.
    ///
    /// Each selected record becomes every column's text joined by
    /// `column_separator`, followed by `line_separator`.
    pub fn selection_as_string(&self, column_separator: &str, line_separator: &str) -> String {
        let Ok(guard) = self.inner.read() else {
            return String::new();
        };

        let mut out = String::new();
        for record in guard.selection.iter().filter_map(|i| guard.rows.get(i)) {
            for (i, column) in guard.columns.iter().enumerate() {
                if i > 0 {
                    out.push_str(column_separator);
                }
                out.push_str(&column.string_value_for(record));
            }
            out.push_str(line_separator);
        }
        out
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Get current sort state.
    pub fn sort_state(&self) -> SortState {
        self.inner.read().map(|g| g.sort).unwrap_or_default()
    }

    /// Sort by a column, toggling direction on repeated calls.
    ///
    /// The first sort on a column is ascending; each further call on the
    /// same column reverses it. The sort is stable. Selection stays
    /// positional, so selected indices now point at different records.
    ///
    /// Returns false, leaving the sort state untouched, when the column does
    /// not exist or cannot be ordered.
    pub fn sort_by(&self, column: usize) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let Some(compare) = guard.columns.get(column).and_then(|c| c.field().comparator()) else {
            debug!("sort_by: column {column} has no ordering");
            return false;
        };

        let ascending = guard.sort.next_direction(column);
        if ascending {
            guard.rows.sort_by(|a, b| compare(a, b));
        } else {
            guard.rows.sort_by(|a, b| compare(b, a));
        }
        guard.sort = SortState {
            column: Some(column),
            ascending,
        };

        debug!(
            "sort_by: column {column} {} over {} rows",
            if ascending { "ascending" } else { "descending" },
            guard.rows.len()
        );
        self.mark_dirty();
        true
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the table has changed since the last `clear_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}
