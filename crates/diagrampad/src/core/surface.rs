//! Editing surface and confirmation collaborators

/// The text editing component, seen as an opaque buffer
///
/// Change notifications travel the other way, as
/// [`Command::TextChanged`](crate::editor::Command::TextChanged) or
/// [`Command::Edit`](crate::editor::Command::Edit).
pub trait EditingSurface: Send {
    /// Current text
    fn value(&self) -> String;

    /// Replace the whole text
    fn set_value(&mut self, text: &str);
}

/// Plain in-memory editing surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Append a line, inserting a newline first when the buffer is not empty
    pub fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl EditingSurface for TextBuffer {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// A question the user must answer before a destructive step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Saving would overwrite a stored diagram under a new name
    Rename { from: String, to: String },
    /// Deleting a stored diagram
    Delete { name: String },
}

impl Confirmation {
    /// Text shown to the user
    pub fn prompt(&self) -> String {
        match self {
            Confirmation::Rename { from, to } => {
                format!("Update diagram \"{}\" to \"{}\"?", from, to)
            }
            Confirmation::Delete { name } => {
                format!("Delete diagram \"{}\"?\n\nThis action cannot be undone.", name)
            }
        }
    }
}

/// Answers [`Confirmation`] requests
///
/// Answering is synchronous: hosts show a modal question and block on it.
pub trait Confirm {
    /// True only on an affirmative answer
    fn confirm(&mut self, request: &Confirmation) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Confirmation) -> bool,
{
    fn confirm(&mut self, request: &Confirmation) -> bool {
        self(request)
    }
}

/// Gives the same answer to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _request: &Confirmation) -> bool {
        self.0
    }
}
