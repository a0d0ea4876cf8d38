//! Tests for field descriptors and columns.

use tablekit::{Alignment, Color, Column, FieldDescriptor, ValidationError, validate_record};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    email: String,
    age: u32,
}

fn person(name: &str, email: &str, age: u32) -> Person {
    Person {
        name: name.to_string(),
        email: email.to_string(),
        age,
    }
}

fn age_field() -> FieldDescriptor<Person> {
    FieldDescriptor::new("Age", |p: &Person| p.age.to_string())
        .order_by_key(|p: &Person| p.age)
        .validator(|p: &Person| {
            if p.age > 150 {
                Err("Age must be between 0 and 150".to_string())
            } else {
                Ok(())
            }
        })
}

#[test]
fn test_string_value_for() {
    let name = FieldDescriptor::new("Name", |p: &Person| p.name.clone());
    assert_eq!(name.label(), "Name");
    assert_eq!(name.string_value_for(&person("Alice", "", 30)), "Alice");
}

#[test]
fn test_default_order_is_lexicographic() {
    let age_text = FieldDescriptor::new("Age", |p: &Person| p.age.to_string());
    let less = age_text.less_than().expect("accessor order");
    // "9" sorts after "30" as text
    assert!(less(&person("a", "", 30), &person("b", "", 9)));
    assert!(!less(&person("b", "", 9), &person("a", "", 30)));
}

#[test]
fn test_default_order_equal_strings_are_not_less() {
    let name = FieldDescriptor::new("Name", |p: &Person| p.name.clone());
    let less = name.less_than().expect("accessor order");
    let a = person("Same", "x", 1);
    let b = person("Same", "y", 2);
    assert!(!less(&a, &b));
    assert!(!less(&b, &a));
}

#[test]
fn test_explicit_order_wins() {
    let less = age_field().less_than().expect("explicit order");
    assert!(less(&person("b", "", 9), &person("a", "", 30)));
}

#[test]
fn test_unordered_field_has_no_order() {
    let field = FieldDescriptor::new("Notes", |p: &Person| p.email.clone()).unordered();
    assert!(!field.is_ordered());
    assert!(field.less_than().is_none());
    assert!(field.comparator().is_none());
}

#[test]
fn test_validate_without_validator_is_ok() {
    let name = FieldDescriptor::new("Name", |p: &Person| p.name.clone());
    assert!(!name.has_validator());
    assert_eq!(name.validate(&person("", "", 0)), Ok(()));
}

#[test]
fn test_validate_reports_field_label() {
    let err = age_field()
        .validate(&person("Old", "", 200))
        .expect_err("age out of range");
    assert_eq!(err, ValidationError::new("Age", "Age must be between 0 and 150"));
    assert_eq!(err.to_string(), "Age: Age must be between 0 and 150");
}

#[test]
fn test_validate_record_collects_all_failures() {
    let email = FieldDescriptor::new("EMail", |p: &Person| p.email.clone()).validator(|p: &Person| {
        if p.email.contains('@') || p.email.is_empty() {
            Ok(())
        } else {
            Err("Invalid email".to_string())
        }
    });
    let age = age_field();

    let result = validate_record([&email, &age], &person("Bob", "nope", 151));
    assert!(result.is_invalid());
    let fields: Vec<_> = result.errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["EMail", "Age"]);

    assert!(validate_record([&email, &age], &person("Bob", "b@x.io", 40)).is_valid());
}

#[test]
fn test_column_metadata() {
    let column = Column::new(age_field(), 40).align(Alignment::Trailing);
    assert_eq!(column.width(), 40);
    assert_eq!(column.alignment(), Alignment::Trailing);
    assert_eq!(column.label(), "Age");
    assert!(!column.is_icon());
    assert_eq!(column.color_for(&person("a", "", 1)), None);
}

#[test]
fn test_icon_column_color() {
    let warn = Color::rgb(240, 80, 0);
    let column = Column::new(FieldDescriptor::new("?", |p: &Person| p.email.clone()), 4).icon(
        move |p: &Person| {
            if p.email.is_empty() {
                warn
            } else {
                Color::Transparent
            }
        },
    );
    assert!(column.is_icon());
    assert_eq!(column.color_for(&person("a", "", 1)), Some(warn));
    assert_eq!(column.color_for(&person("a", "a@b", 1)), Some(Color::Transparent));
}
