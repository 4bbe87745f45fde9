//! Enumerations for TUI state management.

/// What is drawn over the main layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    /// Sidebar, header and the content of the active view.
    Browse,
    Help,
    /// Waiting for the user to confirm a delete.
    Confirm,
}

/// Fields of the task form, in tab order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Title,
    Description,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        }
    }
}
