//! Column definitions for the table.

use std::sync::Arc;

use crate::color::Color;
use crate::field::FieldDescriptor;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Leading,
    Center,
    Trailing,
}

/// Derives a marker color from a record.
pub type ColorSelector<T> = Arc<dyn Fn(&T) -> Color + Send + Sync>;

/// Column configuration.
///
/// A column is a [`FieldDescriptor`] plus display metadata. Columns with a
/// color selector are "icon columns": renderers show the derived marker
/// instead of the field text.
///
/// # Examples
///
/// ```
/// use tablekit::{Alignment, Color, Column, FieldDescriptor};
///
/// struct Person {
///     email: String,
/// }
///
/// let status = Column::new(FieldDescriptor::new("?", |p: &Person| p.email.clone()), 4)
///     .align(Alignment::Trailing)
///     .icon(|p: &Person| {
///         if p.email.is_empty() {
///             Color::hex(0xF05000)
///         } else {
///             Color::Transparent
///         }
///     });
///
/// assert!(status.is_icon());
/// ```
pub struct Column<T> {
    field: FieldDescriptor<T>,
    width: u16,
    alignment: Alignment,
    color_selector: Option<ColorSelector<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            width: self.width,
            alignment: self.alignment,
            color_selector: self.color_selector.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field)
            .field("width", &self.width)
            .field("alignment", &self.alignment)
            .field("icon", &self.is_icon())
            .finish()
    }
}

impl<T> Column<T> {
    /// Create a new column with explicit width.
    ///
    /// # Arguments
    /// * `field` - The field this column displays
    /// * `width` - Width in display cells
    pub fn new(field: FieldDescriptor<T>, width: u16) -> Self {
        Self {
            field,
            width,
            alignment: Alignment::Leading,
            color_selector: None,
        }
    }

    /// Set the column alignment.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Turn this into an icon column.
    pub fn icon(mut self, selector: impl Fn(&T) -> Color + Send + Sync + 'static) -> Self {
        self.color_selector = Some(Arc::new(selector));
        self
    }

    pub fn field(&self) -> &FieldDescriptor<T> {
        &self.field
    }

    pub fn label(&self) -> &str {
        self.field.label()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn is_icon(&self) -> bool {
        self.color_selector.is_some()
    }

    /// Marker color for a record. `None` for text columns.
    pub fn color_for(&self, record: &T) -> Option<Color> {
        self.color_selector.as_ref().map(|selector| selector(record))
    }

    pub fn string_value_for(&self, record: &T) -> String {
        self.field.string_value_for(record)
    }
}
