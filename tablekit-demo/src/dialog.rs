//! Console collaborators for the table container: the add/edit form, the
//! delete confirmation and the clipboard.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use tablekit::{
    Clipboard, ConfirmDelete, ConfirmReply, DeletePrompt, EditCompletion, EditRequest,
    EditTarget, EditWorkflow, Table, ValidationResult,
};

use crate::console::{ConsoleError, SharedIo};

/// Typed at a form prompt to cancel the dialog.
pub const CANCEL: &str = ":q";

/// Typed at a form prompt to clear the field.
pub const CLEAR: &str = "-";

/// One editable field of a record.
pub struct FormField<T> {
    pub label: &'static str,
    pub get: fn(&T) -> String,
    /// Parses and stores the entered text, or explains why it was rejected.
    pub set: fn(&mut T, &str) -> Result<(), String>,
}

impl<T> FormField<T> {
    pub const fn new(
        label: &'static str,
        get: fn(&T) -> String,
        set: fn(&mut T, &str) -> Result<(), String>,
    ) -> Self {
        Self { label, get, set }
    }
}

/// Add/edit dialog that prompts for each field in turn.
///
/// Enter keeps the shown value, `-` clears it and `:q` (or end of input)
/// cancels. A rejected value is asked for again; a record that fails the
/// table's column validation is shown with its errors and edited again.
pub struct ConsoleDialog<T> {
    noun: &'static str,
    io: SharedIo,
    fields: Vec<FormField<T>>,
    table: Table<T>,
}

impl<T: Clone + 'static> ConsoleDialog<T> {
    pub fn new(noun: &'static str, io: SharedIo, fields: Vec<FormField<T>>, table: Table<T>) -> Self {
        Self {
            noun,
            io,
            fields,
            table,
        }
    }

    fn say(&self, text: &str) -> Result<(), ConsoleError> {
        self.io.borrow_mut().println(text)
    }

    /// Ask for one field until the setter accepts it. `None` cancels.
    fn ask(&self, field: &FormField<T>, record: &mut T) -> Result<Option<()>, ConsoleError> {
        loop {
            let current = (field.get)(record);
            let prompt = format!("  {} [{}]: ", field.label, current);
            let answer = self.io.borrow_mut().prompt(&prompt)?;
            let Some(answer) = answer else {
                return Ok(None);
            };
            let value = match answer.trim() {
                CANCEL => return Ok(None),
                "" => current.as_str(),
                CLEAR => "",
                typed => typed,
            };
            match (field.set)(record, value) {
                Ok(()) => return Ok(Some(())),
                Err(message) => self.say(&format!("  {message}"))?,
            }
        }
    }

    /// Run the form until the record validates. `None` if cancelled.
    fn run_form(&self, title: &str, mut record: T) -> Result<Option<T>, ConsoleError> {
        self.say(&format!("{title} (Enter keeps, {CLEAR} clears, {CANCEL} cancels)"))?;
        loop {
            for field in &self.fields {
                if self.ask(field, &mut record)?.is_none() {
                    return Ok(None);
                }
            }
            match self.table.validate(&record) {
                ValidationResult::Valid => return Ok(Some(record)),
                ValidationResult::Invalid(errors) => {
                    for error in &errors {
                        warn!("dialog: {error}");
                        self.say(&format!("  {error}"))?;
                    }
                    self.say("Please correct the record.")?;
                }
            }
        }
    }
}

impl<T: Clone + 'static> EditWorkflow<T> for ConsoleDialog<T> {
    fn edit(&self, request: EditRequest<T>, completion: EditCompletion<T>) {
        let title = match request.target {
            EditTarget::Add => format!("Add {}", self.noun),
            EditTarget::Existing(index) => format!("Edit {} (row {})", self.noun, index + 1),
        };

        match self.run_form(&title, request.record) {
            Ok(Some(record)) => {
                if let Err(e) = completion.complete(record) {
                    warn!("dialog: could not save: {e}");
                    let _ = self.say(&format!("Could not save: {e}"));
                }
            }
            Ok(None) => {
                info!("dialog: {title} cancelled");
                let _ = self.say("Cancelled.");
            }
            Err(e) => warn!("dialog: {e}"),
        }
    }
}

/// Asks y/N before deleting. Anything but `y`/`yes` declines.
pub struct ConsoleConfirm {
    io: SharedIo,
}

impl ConsoleConfirm {
    pub fn new(io: SharedIo) -> Self {
        Self { io }
    }
}

impl ConfirmDelete for ConsoleConfirm {
    fn confirm(&self, prompt: &DeletePrompt, reply: ConfirmReply) {
        let question = format!("{}: {} [y/N] ", prompt.title, prompt.message);
        let answer = match self.io.borrow_mut().prompt(&question) {
            Ok(answer) => answer.unwrap_or_default(),
            Err(e) => {
                warn!("confirm: {e}");
                return;
            }
        };
        let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
        let deleted = reply.resolve(confirmed);
        let _ = self.io.borrow_mut().println(&format!("Deleted {deleted} item(s)."));
    }
}

/// In-process clipboard. Clones share their contents.
#[derive(Clone)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<String>>,
    io: SharedIo,
}

impl MemoryClipboard {
    pub fn new(io: SharedIo) -> Self {
        Self {
            contents: Rc::default(),
            io,
        }
    }

    pub fn contents(&self) -> String {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: String) {
        let lines = text.lines().count();
        *self.contents.borrow_mut() = text;
        info!("clipboard: {lines} line(s)");
        let _ = self.io.borrow_mut().println(&format!("Copied {lines} row(s)."));
    }
}
