//! Row selection state.
//!
//! Selection is positional: it tracks row indices, not records. Any
//! structural change to the rows must clear or trim it.

use std::collections::BTreeSet;

/// Rows whose selection state changed during an operation.
///
/// Renderers use this to refresh only the affected rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    /// Newly selected row, if any.
    pub added: Option<usize>,
    /// Rows that were deselected.
    pub removed: Vec<usize>,
}

impl SelectionDelta {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_none() && self.removed.is_empty()
    }
}

/// Set of selected row indices.
///
/// Iteration is ascending by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<usize>,
}

impl SelectionSet {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a row as selected. Returns true if it was not selected before.
    pub fn add(&mut self, index: usize) -> bool {
        self.selected.insert(index)
    }

    /// Unmark a row. Returns true if it was selected.
    pub fn remove(&mut self, index: usize) -> bool {
        self.selected.remove(&index)
    }

    /// Check if a row is selected.
    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Clear all selection.
    /// Returns the rows that were deselected.
    pub fn clear(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Get the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Lowest selected row.
    pub fn first(&self) -> Option<usize> {
        self.selected.first().copied()
    }

    /// Iterate over selected rows.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Select exactly one row, clearing the others.
    pub fn select_only(&mut self, index: usize) -> SelectionDelta {
        let was_selected = self.selected.contains(&index);
        let removed: Vec<_> = self.selected.iter().copied().filter(|&i| i != index).collect();
        self.selected.clear();
        self.selected.insert(index);
        SelectionDelta {
            added: (!was_selected).then_some(index),
            removed,
        }
    }

    /// Toggle selection of a row (Ctrl+click behavior).
    pub fn toggle(&mut self, index: usize) -> SelectionDelta {
        if self.selected.remove(&index) {
            SelectionDelta {
                added: None,
                removed: vec![index],
            }
        } else {
            self.selected.insert(index);
            SelectionDelta {
                added: Some(index),
                removed: vec![],
            }
        }
    }

    /// Drop every index that is not below `len`.
    /// Returns the rows that were deselected.
    pub fn retain_below(&mut self, len: usize) -> Vec<usize> {
        self.selected.split_off(&len).into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.selected.iter().copied()
    }
}

impl FromIterator<usize> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}
