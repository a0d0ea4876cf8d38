//! CRUD orchestration around a [`Table`].
//!
//! [`TableContainer`] adds the Add/Edit/Delete workflow and custom
//! [`ItemAction`]s to a table, and keeps the enabled state of every control
//! in line with the selection.
//!
//! Editing and delete confirmation are delegated to collaborators through
//! callback-style traits. Neither blocks: the collaborator gets a
//! single-shot handle ([`EditCompletion`], [`ConfirmReply`]) and resolves it
//! whenever the user answers. Dropping the handle cancels.

use std::sync::{Arc, RwLock};

use log::{debug, info, warn};

use crate::action::ItemAction;
use crate::error::{TableError, ValidationResult};
use crate::selection::SelectionDelta;
use crate::table::Table;

// =============================================================================
// Collaborator contracts
// =============================================================================

/// What an edit workflow is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A new record that will be appended.
    Add,
    /// The record currently at this row.
    Existing(usize),
}

/// A record handed to the edit workflow.
#[derive(Debug, Clone)]
pub struct EditRequest<T> {
    /// Blank record for adds, a copy of the row for edits.
    pub record: T,
    pub target: EditTarget,
}

impl<T> EditRequest<T> {
    pub fn is_add(&self) -> bool {
        self.target == EditTarget::Add
    }

    /// Row being edited, `None` for adds.
    pub fn index(&self) -> Option<usize> {
        match self.target {
            EditTarget::Add => None,
            EditTarget::Existing(index) => Some(index),
        }
    }
}

/// Single-shot continuation of an edit workflow.
///
/// Call [`complete`](Self::complete) once the user confirms. Dropping it
/// without completing leaves the table unchanged.
#[must_use = "dropping the completion cancels the edit"]
pub struct EditCompletion<T> {
    shared: Shared<T>,
    target: EditTarget,
}

impl<T> std::fmt::Debug for EditCompletion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditCompletion")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> EditCompletion<T> {
    pub fn target(&self) -> EditTarget {
        self.target
    }

    /// Store the edited record.
    ///
    /// Adds append; edits replace the row they started from, which fails if
    /// that row no longer exists.
    pub fn complete(self, edited: T) -> Result<(), TableError> {
        match self.target {
            EditTarget::Add => {
                info!("edit workflow: adding record");
                self.shared.table.add_item(edited);
            }
            EditTarget::Existing(index) => {
                info!("edit workflow: replacing row {index}");
                self.shared.table.item_edited(index, edited)?;
            }
        }
        self.shared.refresh_controls();
        Ok(())
    }
}

/// Presents an add/edit dialog.
///
/// Implementations show the record, run whatever field validation they
/// want, and call `completion.complete(edited)` at most once, only if the
/// user confirms.
pub trait EditWorkflow<T> {
    fn edit(&self, request: EditRequest<T>, completion: EditCompletion<T>);
}

impl<T, F> EditWorkflow<T> for F
where
    F: Fn(EditRequest<T>, EditCompletion<T>),
{
    fn edit(&self, request: EditRequest<T>, completion: EditCompletion<T>) {
        self(request, completion)
    }
}

/// Question put to the user before deleting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub message: String,
    /// Number of rows that will be deleted.
    pub count: usize,
}

impl DeletePrompt {
    fn for_count(count: usize) -> Self {
        Self {
            title: "Confirm Delete".to_string(),
            message: format!("Delete {count} selected item(s)?"),
            count,
        }
    }
}

/// Single-shot answer to a [`DeletePrompt`].
#[must_use = "dropping the reply cancels the delete"]
pub struct ConfirmReply {
    on_confirm: Box<dyn FnOnce() -> usize>,
}

impl std::fmt::Debug for ConfirmReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmReply").finish_non_exhaustive()
    }
}

impl ConfirmReply {
    /// Go ahead with the delete. Returns the number of rows removed.
    pub fn confirm(self) -> usize {
        (self.on_confirm)()
    }

    /// Resolve with the user's answer.
    pub fn resolve(self, confirmed: bool) -> usize {
        if confirmed { self.confirm() } else { 0 }
    }
}

/// Asks the user to confirm a delete.
pub trait ConfirmDelete {
    fn confirm(&self, prompt: &DeletePrompt, reply: ConfirmReply);
}

impl<F> ConfirmDelete for F
where
    F: Fn(&DeletePrompt, ConfirmReply),
{
    fn confirm(&self, prompt: &DeletePrompt, reply: ConfirmReply) {
        self(prompt, reply)
    }
}

/// Receives exported selection text.
pub trait Clipboard {
    fn set_text(&self, text: String);
}

// =============================================================================
// Controls
// =============================================================================

/// Enabled state of every control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
    /// One entry per custom action, in order.
    pub custom: Vec<bool>,
}

/// Container commands, decoupled from whatever key or button triggers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Edit,
    Delete,
    SelectAll,
    Copy,
    /// Custom action by position.
    Custom(usize),
}

// =============================================================================
// Shared state
// =============================================================================

/// State reachable from both the container and its pending callbacks.
struct Shared<T> {
    table: Table<T>,
    actions: Arc<[ItemAction<T>]>,
    controls: Arc<RwLock<ControlState>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            actions: Arc::clone(&self.actions),
            controls: Arc::clone(&self.controls),
        }
    }
}

impl<T: Clone + 'static> Shared<T> {
    /// Recompute control state from the current selection.
    fn refresh_controls(&self) -> ControlState {
        let selected: Vec<T> = self.table.selected_items().into_values().collect();
        let any = !selected.is_empty();
        let state = ControlState {
            add: true,
            edit: any,
            delete: any,
            custom: self
                .actions
                .iter()
                .map(|action| action.is_enabled_for(&selected))
                .collect(),
        };
        debug!("controls: {} selected -> {:?}", selected.len(), state);
        if let Ok(mut guard) = self.controls.write() {
            *guard = state.clone();
        }
        state
    }
}

// =============================================================================
// TableContainer
// =============================================================================

/// A table with CRUD controls and custom actions.
pub struct TableContainer<T> {
    shared: Shared<T>,
    editor: Box<dyn EditWorkflow<T>>,
    confirmer: Box<dyn ConfirmDelete>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl<T> std::fmt::Debug for TableContainer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableContainer")
            .field("table", &self.shared.table)
            .field("actions", &self.shared.actions)
            .field("has_clipboard", &self.clipboard.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> TableContainer<T> {
    /// Create a container with no custom actions.
    ///
    /// # Arguments
    /// * `table` - The table to orchestrate
    /// * `editor` - Add/edit dialog collaborator
    /// * `confirmer` - Delete confirmation collaborator
    pub fn new(
        table: Table<T>,
        editor: impl EditWorkflow<T> + 'static,
        confirmer: impl ConfirmDelete + 'static,
    ) -> Self {
        let container = Self {
            shared: Shared {
                table,
                actions: Arc::from(Vec::new()),
                controls: Arc::new(RwLock::new(ControlState::default())),
            },
            editor: Box::new(editor),
            confirmer: Box::new(confirmer),
            clipboard: None,
        };
        container.refresh_controls();
        container
    }

    /// Set the custom actions.
    pub fn with_actions(mut self, actions: Vec<ItemAction<T>>) -> Self {
        self.shared.actions = Arc::from(actions);
        self.refresh_controls();
        self
    }

    /// Set the clipboard used by [`Command::Copy`].
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    pub fn table(&self) -> &Table<T> {
        &self.shared.table
    }

    pub fn actions(&self) -> &[ItemAction<T>] {
        &self.shared.actions
    }

    /// Current control state.
    pub fn controls(&self) -> ControlState {
        self.shared
            .controls
            .read()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Recompute control state from the current selection.
    ///
    /// Container methods call this themselves; call it after mutating the
    /// table directly.
    pub fn refresh_controls(&self) -> ControlState {
        self.shared.refresh_controls()
    }

    /// Run field validation for a record (for dialogs).
    pub fn validate(&self, record: &T) -> ValidationResult {
        self.shared.table.validate(record)
    }

    // -------------------------------------------------------------------------
    // Data and sorting
    // -------------------------------------------------------------------------

    /// Replace all rows. Clears the selection.
    pub fn set_data(&self, rows: Vec<T>) {
        self.shared.table.set_data(rows);
        self.refresh_controls();
    }

    /// Sort by a column (header click).
    ///
    /// Selection is positional, so custom action state is recomputed.
    pub fn sort_by(&self, column: usize) -> bool {
        let sorted = self.shared.table.sort_by(column);
        if sorted {
            self.refresh_controls();
        }
        sorted
    }

    // -------------------------------------------------------------------------
    // Selection events
    // -------------------------------------------------------------------------

    /// A row was added to the selection.
    pub fn on_row_selected(&self, index: usize) -> Result<bool, TableError> {
        let changed = self.shared.table.select(index)?;
        self.refresh_controls();
        Ok(changed)
    }

    /// A row was removed from the selection.
    pub fn on_row_unselected(&self, index: usize) -> Result<bool, TableError> {
        let changed = self.shared.table.deselect(index)?;
        self.refresh_controls();
        Ok(changed)
    }

    /// A row was Ctrl+clicked.
    pub fn on_row_toggled(&self, index: usize) -> Result<SelectionDelta, TableError> {
        let delta = self.shared.table.toggle_select(index)?;
        self.refresh_controls();
        Ok(delta)
    }

    /// A row was clicked: it becomes the only selected row.
    pub fn on_row_clicked(&self, index: usize) -> Result<SelectionDelta, TableError> {
        let delta = self.shared.table.select_only(index)?;
        self.refresh_controls();
        Ok(delta)
    }

    pub fn select_all(&self) {
        self.shared.table.select_all();
        self.refresh_controls();
    }

    pub fn clear_selection(&self) -> Vec<usize> {
        let removed = self.shared.table.deselect_all();
        self.refresh_controls();
        removed
    }

    // -------------------------------------------------------------------------
    // Workflows
    // -------------------------------------------------------------------------

    fn completion(&self, target: EditTarget) -> EditCompletion<T> {
        EditCompletion {
            shared: self.shared.clone(),
            target,
        }
    }

    /// Start the add workflow with a blank record.
    pub fn add(&self) -> bool {
        let Some(record) = self.shared.table.new_item() else {
            return false;
        };
        info!("add: opening edit workflow");
        self.editor.edit(
            EditRequest {
                record,
                target: EditTarget::Add,
            },
            self.completion(EditTarget::Add),
        );
        true
    }

    /// Start the edit workflow on the lowest selected row.
    ///
    /// Returns false when nothing is selected.
    pub fn edit(&self) -> bool {
        let Some((index, record)) = self.shared.table.first_selected() else {
            debug!("edit: nothing selected");
            return false;
        };
        info!("edit: opening edit workflow for row {index}");
        let target = EditTarget::Existing(index);
        self.editor
            .edit(EditRequest { record, target }, self.completion(target));
        true
    }

    /// Ask for confirmation, then delete the selected rows.
    ///
    /// Returns false when nothing is selected.
    pub fn delete(&self) -> bool {
        let count = self.shared.table.selected_count();
        if count == 0 {
            return false;
        }

        let shared = self.shared.clone();
        let reply = ConfirmReply {
            on_confirm: Box::new(move || {
                let deleted = shared.table.delete_selected();
                info!("delete: removed {deleted} rows");
                shared.refresh_controls();
                deleted
            }),
        };
        info!("delete: asking to confirm {count} rows");
        self.confirmer.confirm(&DeletePrompt::for_count(count), reply);
        true
    }

    /// Run a custom action on the lowest selected row.
    ///
    /// Returns false if the action does not exist or is disabled for the
    /// current selection.
    pub fn perform(&self, action: usize) -> bool {
        let Some(item_action) = self.shared.actions.get(action) else {
            warn!("perform: no custom action {action}");
            return false;
        };
        let selected: Vec<(usize, T)> = self.shared.table.selected_items().into_iter().collect();
        let records: Vec<T> = selected.iter().map(|(_, record)| record.clone()).collect();
        let Some((index, record)) = selected.first() else {
            debug!("perform: nothing selected");
            return false;
        };
        if !item_action.is_enabled_for(&records) {
            debug!("perform: '{}' disabled", item_action.label());
            return false;
        }

        info!("perform: '{}' on row {index}", item_action.label());
        item_action.perform(record);
        true
    }

    /// Send the selection to a clipboard as tab-separated lines.
    /// Returns the number of rows copied.
    pub fn copy_selection_to(&self, clipboard: &dyn Clipboard) -> usize {
        let count = self.shared.table.selected_count();
        if count > 0 {
            clipboard.set_text(self.shared.table.selection_as_string("\t", "\n"));
        }
        count
    }

    /// Run a command. Returns false if it did nothing.
    pub fn dispatch(&self, command: Command) -> bool {
        debug!("dispatch: {command:?}");
        match command {
            Command::Add => self.add(),
            Command::Edit => self.edit(),
            Command::Delete => self.delete(),
            Command::SelectAll => {
                self.select_all();
                true
            }
            Command::Copy => match &self.clipboard {
                Some(clipboard) => self.copy_selection_to(clipboard.as_ref()) > 0,
                None => false,
            },
            Command::Custom(action) => self.perform(action),
        }
    }
}
