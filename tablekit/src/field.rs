//! Field descriptors: how a column projects a record.
//!
//! A [`FieldDescriptor`] turns an arbitrary record into display text and,
//! optionally, validates it and orders it. The table engine only ever talks
//! to records through descriptors.
//!
//! # Examples
//!
//! ```
//! use tablekit::FieldDescriptor;
//!
//! #[derive(Clone)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let name = FieldDescriptor::new("Name", |p: &Person| p.name.clone());
//! let age = FieldDescriptor::new("Age", |p: &Person| p.age.to_string())
//!     .order_by_key(|p: &Person| p.age)
//!     .validator(|p: &Person| {
//!         if p.age > 150 {
//!             Err("Age must be between 0 and 150".into())
//!         } else {
//!             Ok(())
//!         }
//!     });
//!
//! let bob = Person { name: "Bob".into(), age: 9 };
//! let alice = Person { name: "Alice".into(), age: 30 };
//!
//! // "9" > "30" as strings, but the explicit order compares numbers.
//! let less = age.less_than().unwrap();
//! assert!(less(&bob, &alice));
//! assert_eq!(name.string_value_for(&alice), "Alice");
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{ValidationError, ValidationResult};

/// Projection of a record to its display string.
pub type Accessor<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Strict "less than" relation between two records.
pub type LessThan<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Field-level validation rule. The error string is the message only.
pub type FieldRule<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// How a field orders records.
enum FieldOrder<T> {
    /// Compare accessor output as strings.
    Accessor,
    /// Caller-supplied relation.
    Explicit(LessThan<T>),
    /// Field cannot be sorted.
    Unordered,
}

impl<T> Clone for FieldOrder<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Accessor => Self::Accessor,
            Self::Explicit(less) => Self::Explicit(Arc::clone(less)),
            Self::Unordered => Self::Unordered,
        }
    }
}

/// Per-column projection of a record: label, display text, validation and
/// ordering.
pub struct FieldDescriptor<T> {
    label: String,
    accessor: Accessor<T>,
    validator: Option<FieldRule<T>>,
    order: FieldOrder<T>,
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            accessor: Arc::clone(&self.accessor),
            validator: self.validator.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = match self.order {
            FieldOrder::Accessor => "accessor",
            FieldOrder::Explicit(_) => "explicit",
            FieldOrder::Unordered => "unordered",
        };
        f.debug_struct("FieldDescriptor")
            .field("label", &self.label)
            .field("validated", &self.validator.is_some())
            .field("order", &order)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> FieldDescriptor<T> {
    /// Create a descriptor ordered by its accessor text.
    pub fn new(
        label: impl Into<String>,
        accessor: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            accessor: Arc::new(accessor),
            validator: None,
            order: FieldOrder::Accessor,
        }
    }

    /// Attach a validation rule.
    pub fn validator(
        mut self,
        rule: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(rule));
        self
    }

    /// Order records with an explicit "less than" relation.
    ///
    /// Use this when the display strings do not sort correctly, e.g.
    /// numbers rendered as text.
    pub fn order_by(mut self, less: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        self.order = FieldOrder::Explicit(Arc::new(less));
        self
    }

    /// Order records by a derived key.
    pub fn order_by_key<K: PartialOrd>(
        self,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        self.order_by(move |a, b| key(a) < key(b))
    }

    /// Mark the field as not sortable.
    pub fn unordered(mut self) -> Self {
        self.order = FieldOrder::Unordered;
        self
    }
}

impl<T> FieldDescriptor<T> {
    /// Header label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Display text for a record. Also the default sort key.
    pub fn string_value_for(&self, record: &T) -> String {
        (self.accessor)(record)
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Check if the field can be sorted.
    pub fn is_ordered(&self) -> bool {
        !matches!(self.order, FieldOrder::Unordered)
    }

    /// Run the validation rule, if any.
    pub fn validate(&self, record: &T) -> Result<(), ValidationError> {
        match &self.validator {
            Some(rule) => rule(record).map_err(|message| ValidationError::new(&self.label, message)),
            None => Ok(()),
        }
    }
}

impl<T: 'static> FieldDescriptor<T> {
    /// Resolve the ordering relation.
    ///
    /// Returns the explicit relation if one was given, otherwise one derived
    /// from the accessor text. `None` only for unordered fields.
    pub fn less_than(&self) -> Option<LessThan<T>> {
        match &self.order {
            FieldOrder::Explicit(less) => Some(Arc::clone(less)),
            FieldOrder::Accessor => {
                let accessor = Arc::clone(&self.accessor);
                Some(Arc::new(move |a: &T, b: &T| accessor(a) < accessor(b)))
            }
            FieldOrder::Unordered => None,
        }
    }

    /// Resolve the ordering as a total comparator suitable for `sort_by`.
    ///
    /// Records where neither is less than the other compare `Equal`.
    pub fn comparator(&self) -> Option<impl Fn(&T, &T) -> Ordering + use<T>> {
        let less = self.less_than()?;
        Some(move |a: &T, b: &T| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }
}

/// Validate a whole record against a set of fields.
///
/// Every failing field is reported, in field order.
pub fn validate_record<'a, T: 'a>(
    fields: impl IntoIterator<Item = &'a FieldDescriptor<T>>,
    record: &T,
) -> ValidationResult {
    fields
        .into_iter()
        .filter_map(|field| field.validate(record).err())
        .collect::<Vec<_>>()
        .into()
}
