//! Custom row actions shown next to Add/Edit/Delete.

use std::sync::Arc;

/// Runs an action on one record.
pub type Perform<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Decides whether an action applies to the current selection.
pub type Enabler<T> = Arc<dyn Fn(&[T]) -> bool + Send + Sync>;

/// A custom, selection-gated action.
///
/// An action is enabled iff the selection is non-empty and its enabler
/// (default: always true) accepts the whole selection.
///
/// # Examples
///
/// ```
/// use tablekit::ItemAction;
///
/// let mail = ItemAction::new("Mail", |address: &String| println!("mailing {address}"))
///     .icon("mail-send")
///     .enabled_when(|rows: &[String]| rows.len() == 1 && !rows[0].is_empty());
///
/// assert!(!mail.is_enabled_for(&[]));
/// assert!(mail.is_enabled_for(&["a@b.c".to_string()]));
/// ```
pub struct ItemAction<T> {
    label: String,
    icon: Option<String>,
    perform: Perform<T>,
    enabler: Option<Enabler<T>>,
}

impl<T> Clone for ItemAction<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            icon: self.icon.clone(),
            perform: Arc::clone(&self.perform),
            enabler: self.enabler.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ItemAction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemAction")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("gated", &self.enabler.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> ItemAction<T> {
    /// Create an action enabled for any non-empty selection.
    pub fn new(label: impl Into<String>, perform: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            icon: None,
            perform: Arc::new(perform),
            enabler: None,
        }
    }

    /// Set the icon name. Renderers show the icon instead of the label.
    pub fn icon(mut self, name: impl Into<String>) -> Self {
        self.icon = Some(name.into());
        self
    }

    /// Gate the action on the selected records.
    pub fn enabled_when(mut self, enabler: impl Fn(&[T]) -> bool + Send + Sync + 'static) -> Self {
        self.enabler = Some(Arc::new(enabler));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Check if the action applies to this selection.
    pub fn is_enabled_for(&self, selection: &[T]) -> bool {
        if selection.is_empty() {
            return false;
        }
        self.enabler.as_ref().is_none_or(|enabler| enabler(selection))
    }

    /// Run the action.
    pub fn perform(&self, record: &T) {
        (self.perform)(record)
    }
}
