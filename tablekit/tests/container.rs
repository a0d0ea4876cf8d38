//! Tests for the CRUD container: workflows and control enablement.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tablekit::{
    Clipboard, Column, Command, ConfirmReply, ControlState, DeletePrompt, EditCompletion,
    EditRequest, EditTarget, FieldDescriptor, ItemAction, Table, TableContainer, TableError,
};

#[derive(Debug, Clone, PartialEq, Default)]
struct Person {
    name: String,
    email: String,
}

fn person(name: &str, email: &str) -> Person {
    Person {
        name: name.to_string(),
        email: email.to_string(),
    }
}

fn people() -> Vec<Person> {
    vec![
        person("Alice", "alice@peanuts.com"),
        person("Bob", ""),
        person("Carol", "carol@doughnuts.com"),
        person("June", "jsmith@peanuts.com"),
    ]
}

fn table() -> Table<Person> {
    let table = Table::new(
        vec![
            Column::new(FieldDescriptor::new("Name", |p: &Person| p.name.clone()), 120),
            Column::new(
                FieldDescriptor::new("EMail", |p: &Person| p.email.clone()).validator(|p: &Person| {
                    if p.email.is_empty() || p.email.contains('@') {
                        Ok(())
                    } else {
                        Err("Invalid email".to_string())
                    }
                }),
                190,
            ),
        ],
        Person::default,
    );
    table.set_data(people());
    table
}

type Pending = Rc<RefCell<Vec<(EditRequest<Person>, EditCompletion<Person>)>>>;
type Prompts = Rc<RefCell<Vec<(DeletePrompt, ConfirmReply)>>>;

/// Container whose collaborators park every request for the test to resolve.
struct Harness {
    container: TableContainer<Person>,
    edits: Pending,
    prompts: Prompts,
    mailed: Arc<Mutex<Vec<String>>>,
}

fn harness() -> Harness {
    let edits: Pending = Rc::default();
    let prompts: Prompts = Rc::default();
    let mailed = Arc::new(Mutex::new(Vec::new()));

    let edit_sink = Rc::clone(&edits);
    let prompt_sink = Rc::clone(&prompts);
    let mail_log = Arc::clone(&mailed);

    let mail = ItemAction::new("E", move |p: &Person| {
        mail_log.lock().unwrap().push(p.name.clone());
    })
    .icon("mail-send")
    .enabled_when(|rows: &[Person]| rows.len() == 1 && !rows[0].email.is_empty());

    let container = TableContainer::new(
        table(),
        move |request: EditRequest<Person>, completion: EditCompletion<Person>| {
            edit_sink.borrow_mut().push((request, completion));
        },
        move |prompt: &DeletePrompt, reply: ConfirmReply| {
            prompt_sink.borrow_mut().push((prompt.clone(), reply));
        },
    )
    .with_actions(vec![mail]);

    Harness {
        container,
        edits,
        prompts,
        mailed,
    }
}

fn names(container: &TableContainer<Person>) -> Vec<String> {
    container
        .table()
        .with_data(|rows| rows.iter().map(|p| p.name.clone()).collect())
}

// -----------------------------------------------------------------------------
// Enablement
// -----------------------------------------------------------------------------

#[test]
fn test_initial_controls() {
    let h = harness();
    assert_eq!(
        h.container.controls(),
        ControlState {
            add: true,
            edit: false,
            delete: false,
            custom: vec![false],
        }
    );
}

#[test]
fn test_custom_action_enabler() {
    let h = harness();

    // exactly one, with email
    h.container.on_row_selected(0).unwrap();
    let controls = h.container.controls();
    assert!(controls.edit && controls.delete);
    assert_eq!(controls.custom, vec![true]);

    // two selected
    h.container.on_row_selected(2).unwrap();
    assert_eq!(h.container.controls().custom, vec![false]);

    // exactly one, without email
    h.container.on_row_clicked(1).unwrap();
    let controls = h.container.controls();
    assert!(controls.edit);
    assert_eq!(controls.custom, vec![false]);

    // none
    h.container.on_row_unselected(1).unwrap();
    let controls = h.container.controls();
    assert!(!controls.edit && !controls.delete);
    assert_eq!(controls.custom, vec![false]);
}

#[test]
fn test_action_without_enabler_needs_selection() {
    let container = TableContainer::new(
        table(),
        |_: EditRequest<Person>, _: EditCompletion<Person>| {},
        |_: &DeletePrompt, _: ConfirmReply| {},
    )
    .with_actions(vec![ItemAction::new("Noop", |_: &Person| {})]);

    assert_eq!(container.controls().custom, vec![false]);
    container.select_all();
    assert_eq!(container.controls().custom, vec![true]);
    container.clear_selection();
    assert_eq!(container.controls().custom, vec![false]);
}

#[test]
fn test_sort_recomputes_custom_enablement() {
    let h = harness();
    // row 0 is Alice (has email)
    h.container.on_row_selected(0).unwrap();
    assert_eq!(h.container.controls().custom, vec![true]);

    // ascending by email: "" < "alice@..." so Bob is now row 0
    assert!(h.container.sort_by(1));
    assert_eq!(names(&h.container)[0], "Bob");
    assert_eq!(h.container.controls().custom, vec![false]);
}

#[test]
fn test_out_of_range_selection_event() {
    let h = harness();
    assert_eq!(
        h.container.on_row_selected(10),
        Err(TableError::IndexOutOfRange { index: 10, len: 4 })
    );
    assert!(!h.container.controls().edit);
}

#[test]
fn test_set_data_disables_edit() {
    let h = harness();
    h.container.select_all();
    assert!(h.container.controls().delete);
    h.container.set_data(vec![person("Zed", "")]);
    assert!(!h.container.controls().delete);
}

// -----------------------------------------------------------------------------
// Add / Edit
// -----------------------------------------------------------------------------

#[test]
fn test_add_workflow_appends_on_completion() {
    let h = harness();
    assert!(h.container.add());

    let (request, completion) = h.edits.borrow_mut().pop().expect("edit requested");
    assert!(request.is_add());
    assert_eq!(request.index(), None);
    assert_eq!(request.record, Person::default());
    assert_eq!(h.container.table().len(), 4);

    completion.complete(person("Mitch", "mitch@cranky.com")).unwrap();
    assert_eq!(names(&h.container), vec!["Alice", "Bob", "Carol", "June", "Mitch"]);
}

#[test]
fn test_cancelled_add_changes_nothing() {
    let h = harness();
    h.container.add();
    drop(h.edits.borrow_mut().pop());
    assert_eq!(h.container.table().len(), 4);
}

#[test]
fn test_edit_workflow_replaces_lowest_selected() {
    let h = harness();
    h.container.on_row_selected(3).unwrap();
    h.container.on_row_selected(1).unwrap();
    assert!(h.container.edit());

    let (request, completion) = h.edits.borrow_mut().pop().expect("edit requested");
    assert_eq!(request.target, EditTarget::Existing(1));
    assert_eq!(request.record, person("Bob", ""));

    completion.complete(person("Robert", "bob@x.io")).unwrap();
    assert_eq!(names(&h.container), vec!["Alice", "Robert", "Carol", "June"]);
}

#[test]
fn test_edit_completion_refreshes_controls() {
    let h = harness();
    h.container.on_row_clicked(1).unwrap();
    assert_eq!(h.container.controls().custom, vec![false]);

    h.container.edit();
    let (_, completion) = h.edits.borrow_mut().pop().expect("edit requested");
    completion.complete(person("Bob", "bob@x.io")).unwrap();
    assert_eq!(h.container.controls().custom, vec![true]);
}

#[test]
fn test_edit_without_selection_does_nothing() {
    let h = harness();
    assert!(!h.container.edit());
    assert!(h.edits.borrow().is_empty());
}

#[test]
fn test_edit_completion_for_deleted_row_fails() {
    let h = harness();
    h.container.on_row_clicked(3).unwrap();
    h.container.edit();
    let (_, completion) = h.edits.borrow_mut().pop().expect("edit requested");

    h.container.set_data(vec![person("Only", "")]);
    assert_eq!(
        completion.complete(person("June", "")),
        Err(TableError::IndexOutOfRange { index: 3, len: 1 })
    );
}

#[test]
fn test_validate_for_dialogs() {
    let h = harness();
    assert!(h.container.validate(&person("A", "a@b")).is_valid());
    let result = h.container.validate(&person("A", "nope"));
    assert_eq!(result.first_error().map(|e| e.field.as_str()), Some("EMail"));
}

// -----------------------------------------------------------------------------
// Delete
// -----------------------------------------------------------------------------

#[test]
fn test_delete_confirmed() {
    let h = harness();
    h.container.on_row_selected(1).unwrap();
    h.container.on_row_selected(3).unwrap();
    assert!(h.container.delete());

    let (prompt, reply) = h.prompts.borrow_mut().pop().expect("confirmation asked");
    assert_eq!(prompt.count, 2);
    assert_eq!(prompt.message, "Delete 2 selected item(s)?");
    assert_eq!(h.container.table().len(), 4);

    assert_eq!(reply.confirm(), 2);
    assert_eq!(names(&h.container), vec!["Alice", "Carol"]);
    let controls = h.container.controls();
    assert!(!controls.edit && !controls.delete);
    assert_eq!(controls.custom, vec![false]);
}

#[test]
fn test_delete_declined() {
    let h = harness();
    h.container.on_row_selected(0).unwrap();
    h.container.delete();

    let (_, reply) = h.prompts.borrow_mut().pop().expect("confirmation asked");
    assert_eq!(reply.resolve(false), 0);
    assert_eq!(h.container.table().len(), 4);
    assert!(h.container.controls().delete);
}

#[test]
fn test_delete_without_selection_skips_confirmation() {
    let h = harness();
    assert!(!h.container.delete());
    assert!(h.prompts.borrow().is_empty());
}

// -----------------------------------------------------------------------------
// Custom actions, commands
// -----------------------------------------------------------------------------

#[test]
fn test_perform_custom_action() {
    let h = harness();
    h.container.on_row_selected(2).unwrap();
    assert!(h.container.perform(0));
    assert_eq!(*h.mailed.lock().unwrap(), vec!["Carol".to_string()]);
}

#[test]
fn test_perform_disabled_or_missing_action() {
    let h = harness();
    assert!(!h.container.perform(0));
    h.container.on_row_selected(1).unwrap();
    assert!(!h.container.perform(0));
    assert!(!h.container.perform(5));
    assert!(h.mailed.lock().unwrap().is_empty());
}

#[derive(Clone, Default)]
struct MemoryClipboard(Rc<RefCell<String>>);

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: String) {
        *self.0.borrow_mut() = text;
    }
}

#[test]
fn test_dispatch_copy() {
    let clipboard = MemoryClipboard::default();
    let h = harness();
    let container = h.container.with_clipboard(clipboard.clone());

    assert!(!container.dispatch(Command::Copy));
    container.on_row_selected(0).unwrap();
    assert!(container.dispatch(Command::Copy));
    assert_eq!(*clipboard.0.borrow(), "Alice\talice@peanuts.com\n");
}

#[test]
fn test_dispatch_without_clipboard() {
    let h = harness();
    h.container.select_all();
    assert!(!h.container.dispatch(Command::Copy));
}

#[test]
fn test_dispatch_routes_commands() {
    let h = harness();

    assert!(h.container.dispatch(Command::SelectAll));
    assert_eq!(h.container.table().selected_count(), 4);

    assert!(h.container.dispatch(Command::Edit));
    assert!(h.container.dispatch(Command::Add));
    assert_eq!(h.edits.borrow().len(), 2);

    assert!(h.container.dispatch(Command::Delete));
    assert_eq!(h.prompts.borrow().len(), 1);

    // four rows selected, the mail action wants exactly one
    assert!(!h.container.dispatch(Command::Custom(0)));
}
