//! Address book of people with an e-mail action.

use log::info;
use tablekit::{Alignment, Color, Column, FieldDescriptor, ItemAction, Table, TableContainer};

use crate::console::{Console, SharedIo};
use crate::dialog::{ConsoleConfirm, ConsoleDialog, FormField, MemoryClipboard};
use crate::render::RenderOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub age: u32,
}

impl Person {
    pub fn new(name: &str, email: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            age,
        }
    }
}

/// The starting address book.
pub fn sample() -> Vec<Person> {
    vec![
        Person::new("Alice Smith", "alice@peanuts.com", 30),
        Person::new("Bob Johnson", "", 25),
        Person::new("Carol Williams", "carol@doughnuts.com", 35),
        Person::new("June Smith", "jsmith@peanuts.com", 12),
        Person::new("Rob Johnson", "", 85),
        Person::new("Mitch Sommerset", "mitch@cranky.com", 39),
    ]
}

/// Marker shown for people without an e-mail address.
const MISSING_EMAIL: Color = Color::Rgb {
    r: 240,
    g: 80,
    b: 0,
};

pub fn columns() -> Vec<Column<Person>> {
    let status = FieldDescriptor::new("?", |p: &Person| {
        let status = if p.email.is_empty() { "n" } else { "y" };
        status.to_string()
    });
    let age = FieldDescriptor::new("Age", |p: &Person| p.age.to_string())
        .order_by_key(|p: &Person| p.age);
    let name = FieldDescriptor::new("Name", |p: &Person| p.name.clone());
    let email = FieldDescriptor::new("EMail", |p: &Person| p.email.clone()).validator(|p: &Person| {
        validate_email(&p.email)
    });

    vec![
        Column::new(status, 3)
            .align(Alignment::Trailing)
            .icon(|p: &Person| {
                if p.email.is_empty() {
                    MISSING_EMAIL
                } else {
                    Color::Transparent
                }
            }),
        Column::new(age, 4),
        Column::new(name, 16),
        Column::new(email, 24),
    ]
}

/// Blank or a well-formed address.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() || email_address::EmailAddress::is_valid(email) {
        Ok(())
    } else {
        Err("Must be a valid email address".to_string())
    }
}

pub fn parse_age(text: &str) -> Result<u32, String> {
    if text.is_empty() {
        return Err("Age is required".to_string());
    }
    let age: i64 = text
        .parse()
        .map_err(|_| "Age must be a number".to_string())?;
    if !(0..=150).contains(&age) {
        return Err("Age must be between 0 and 150".to_string());
    }
    u32::try_from(age).map_err(|_| "Age must be between 0 and 150".to_string())
}

pub fn form() -> Vec<FormField<Person>> {
    vec![
        FormField::new(
            "Name",
            |p: &Person| p.name.clone(),
            |p: &mut Person, s: &str| {
                p.name = s.to_string();
                Ok(())
            },
        ),
        FormField::new(
            "Email",
            |p: &Person| p.email.clone(),
            |p: &mut Person, s: &str| {
                p.email = s.to_string();
                Ok(())
            },
        ),
        FormField::new(
            "Age",
            |p: &Person| p.age.to_string(),
            |p: &mut Person, s: &str| {
                p.age = parse_age(s)?;
                Ok(())
            },
        ),
    ]
}

/// "E": mail exactly one person who has an address.
pub fn actions() -> Vec<ItemAction<Person>> {
    vec![
        ItemAction::new("E", |p: &Person| {
            info!("mail action for {}", p.name);
            println!("Email clicked for: {}", p.name);
        })
        .icon("mail-send")
        .enabled_when(|selected: &[Person]| selected.len() == 1 && !selected[0].email.is_empty()),
    ]
}

pub fn table() -> Table<Person> {
    let table = Table::new(columns(), Person::default);
    table.set_data(sample());
    table
}

pub fn console(io: SharedIo, options: RenderOptions) -> Console<Person> {
    let table = table();
    let clipboard = MemoryClipboard::new(io.clone());
    let dialog = ConsoleDialog::new("Person", io.clone(), form(), table.clone());
    let container = TableContainer::new(table, dialog, ConsoleConfirm::new(io.clone()))
        .with_actions(actions())
        .with_clipboard(clipboard.clone());
    Console::new(container, io, clipboard, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleCommand, output_of, scripted};

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("42"), Ok(42));
        assert_eq!(parse_age("0"), Ok(0));
        assert_eq!(parse_age(""), Err("Age is required".to_string()));
        assert_eq!(parse_age("old"), Err("Age must be a number".to_string()));
        assert_eq!(parse_age("151"), Err("Age must be between 0 and 150".to_string()));
        assert_eq!(parse_age("-1"), Err("Age must be between 0 and 150".to_string()));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("alice@peanuts.com").is_ok());
        assert!(validate_email("not an address").is_err());
    }

    #[test]
    fn test_status_marker() {
        let table = table();
        assert_eq!(table.cell_color(0, 0), Some(Color::Transparent));
        assert_eq!(table.cell_color(1, 0), Some(MISSING_EMAIL));
        assert_eq!(table.cell_color(1, 1), None);
    }

    #[test]
    fn test_sort_by_age_is_numeric() {
        let table = table();
        table.set_data(vec![
            Person::new("Old", "", 100),
            Person::new("Young", "", 9),
            Person::new("Mid", "", 30),
        ]);

        assert!(table.sort_by(1));

        let ages: Vec<u32> = table.data().iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![9, 30, 100]);
    }

    #[test]
    fn test_mail_action_enablement() {
        let action = &actions()[0];
        let people = sample();

        assert!(!action.is_enabled_for(&[]));
        assert!(action.is_enabled_for(&people[0..1]));
        assert!(!action.is_enabled_for(&people[1..2]));
        assert!(!action.is_enabled_for(&[people[0].clone(), people[2].clone()]));
    }

    #[test]
    fn test_add_person_rejects_bad_email() {
        let (io, captured) = scripted("Lucy\nlucy at home\n8\n\nlucy@van.pelt\n\n");
        let console = people_console(io);

        console.execute(ConsoleCommand::Add).unwrap();

        let table = console.container().table();
        assert_eq!(table.len(), 7);
        assert_eq!(table.row(6), Some(Person::new("Lucy", "lucy@van.pelt", 8)));
        assert!(output_of(&captured).contains("EMail: Must be a valid email address"));
    }

    #[test]
    fn test_edit_person_age_reprompts() {
        let (io, captured) = scripted("\n\n200\n31\n");
        let console = people_console(io);
        console.container().on_row_clicked(0).unwrap();

        console.execute(ConsoleCommand::Edit).unwrap();

        assert_eq!(console.container().table().row(0).map(|p| p.age), Some(31));
        let output = output_of(&captured);
        assert!(output.contains("Edit Person (row 1)"));
        assert!(output.contains("Age must be between 0 and 150"));
    }

    fn people_console(io: SharedIo) -> Console<Person> {
        console(io, RenderOptions::default())
    }
}
