//! Generic table engine: sortable, multi-select tables of arbitrary records
//! with add/edit/delete orchestration.
//!
//! The engine never looks inside a record. Columns describe how to display,
//! validate and order it through [`FieldDescriptor`]s; painting, dialogs and
//! clipboard access are left to the caller.

pub mod action;
pub mod color;
pub mod column;
pub mod container;
pub mod error;
pub mod field;
pub mod selection;
pub mod table;

pub use action::ItemAction;
pub use color::{Color, Rgb};
pub use column::{Alignment, Column};
pub use container::{
    Clipboard, Command, ConfirmDelete, ConfirmReply, ControlState, DeletePrompt, EditCompletion,
    EditRequest, EditTarget, EditWorkflow, TableContainer,
};
pub use error::{TableError, ValidationError, ValidationResult};
pub use field::{FieldDescriptor, validate_record};
pub use selection::{SelectionDelta, SelectionSet};
pub use table::{SortState, Table};
