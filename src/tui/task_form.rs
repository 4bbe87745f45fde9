//! Task form handling for the terminal user interface.
//!
//! The same form serves new tasks and edits; the session decides which one a
//! submission becomes.

use crate::task::{Task, TaskInput};
use crate::tui::{enums::FormField, input::InputField};

#[derive(Clone, Debug)]
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub current_field: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Empty form with the title focused.
    pub fn new() -> Self {
        TaskForm {
            title: InputField::new(),
            description: InputField::new(),
            current_field: FormField::Title,
        }
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        TaskForm {
            title: InputField::with_value(&task.title),
            description: InputField::with_value(&task.description),
            current_field: FormField::Title,
        }
    }

    /// The values as entered, ready for the session.
    pub fn to_input(&self) -> TaskInput {
        TaskInput::new(self.title.value.clone()).with_description(self.description.value.clone())
    }

    pub fn current_input_mut(&mut self) -> &mut InputField {
        match self.current_field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }

    pub fn current_input(&self) -> &InputField {
        match self.current_field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = self.current_field.next();
    }

    pub fn handle_char(&mut self, c: char) {
        self.current_input_mut().handle_char(c);
    }

    pub fn handle_backspace(&mut self) {
        self.current_input_mut().handle_backspace();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = TaskForm::new();
        for c in "Buy".chars() {
            form.handle_char(c);
        }
        form.next_field();
        for c in "milk".chars() {
            form.handle_char(c);
        }
        form.handle_backspace();

        assert_eq!(form.to_input(), TaskInput::new("Buy").with_description("mil"));
        form.next_field();
        assert_eq!(form.current_field, FormField::Title);
    }

    #[test]
    fn prefilled_from_task() {
        let task = Task {
            id: 3,
            title: "Call mum".into(),
            description: "about Sunday".into(),
            completed: true,
            created_at: Utc::now(),
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.to_input(), TaskInput::from(&task));
        assert_eq!(form.current_input().cursor, 8);
    }
}
