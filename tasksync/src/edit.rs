//! Add/edit form state for a single task.
//!
//! Field changes arrive as [`FieldEdit`] messages, either typed directly or
//! parsed from a `{field, value}` pair with [`FieldEdit::parse`]. A
//! [`TaskForm`] collects them and validates on submit, producing the
//! [`TaskDraft`] or [`Task`] that the store sends to the gateway.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tasksync_proto::task::{MAX_TASK_TEXT_LENGTH, parse_due_date};
use tasksync_proto::{Priority, Task, TaskDraft, TaskId};

/// Form field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Task description.
    Text,
    /// Priority selector.
    Priority,
    /// Due date picker.
    DueDate,
    /// Completion checkbox.
    Completed,
}

impl Field {
    /// Name used in `{field, value}` messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from form input and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Text is empty or only whitespace.
    #[error("task description is required")]
    TextEmpty,
    /// Text exceeds the configured maximum.
    #[error("task description too long (max {max} characters)")]
    TextTooLong {
        /// Maximum allowed characters.
        max: usize,
    },
    /// A `{field, value}` message named no known field.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// A value does not fit its field's type.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Field the value was meant for.
        field: Field,
        /// The rejected value.
        value: String,
    },
}

/// A single change to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Replace the description.
    Text(String),
    /// Choose a priority.
    Priority(Priority),
    /// Set or clear the due date.
    DueDate(Option<NaiveDate>),
    /// Set the completion flag.
    Completed(bool),
}

impl FieldEdit {
    /// Parses an untyped `{field, value}` pair.
    ///
    /// Due dates use `YYYY-MM-DD` (a full timestamp keeps its date); an
    /// empty value clears the date.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for an unrecognised field name, or
    /// [`FormError::InvalidValue`] when `value` does not parse for the field.
    pub fn parse(field: &str, value: &str) -> Result<Self, FormError> {
        let invalid = |field: Field| FormError::InvalidValue {
            field,
            value: value.to_string(),
        };
        match field {
            "text" => Ok(Self::Text(value.to_string())),
            "priority" => value
                .parse()
                .map(Self::Priority)
                .map_err(|_| invalid(Field::Priority)),
            "dueDate" | "due_date" => {
                if value.trim().is_empty() {
                    return Ok(Self::DueDate(None));
                }
                parse_due_date(value)
                    .map(|d| Self::DueDate(Some(d)))
                    .map_err(|_| invalid(Field::DueDate))
            }
            "completed" => value
                .trim()
                .parse()
                .map(Self::Completed)
                .map_err(|_| invalid(Field::Completed)),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }

    /// The field this edit changes.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Text(_) => Field::Text,
            Self::Priority(_) => Field::Priority,
            Self::DueDate(_) => Field::DueDate,
            Self::Completed(_) => Field::Completed,
        }
    }
}

/// Form state for adding a task or editing an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    editing: Option<TaskId>,
    text: String,
    priority: Priority,
    due_date: Option<NaiveDate>,
    completed: bool,
    max_text_len: usize,
    errors: BTreeMap<Field, FormError>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// An empty add form: no text, medium priority, no due date, open.
    #[must_use]
    pub fn new() -> Self {
        Self {
            editing: None,
            text: String::new(),
            priority: Priority::default(),
            due_date: None,
            completed: false,
            max_text_len: MAX_TASK_TEXT_LENGTH,
            errors: BTreeMap::new(),
        }
    }

    /// An edit form pre-filled from `task`.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            editing: Some(task.id),
            text: task.text.clone(),
            priority: task.priority,
            due_date: task.due_date,
            completed: task.completed,
            ..Self::new()
        }
    }

    /// Overrides the maximum description length.
    #[must_use]
    pub fn with_max_text_len(mut self, max_text_len: usize) -> Self {
        self.max_text_len = max_text_len;
        self
    }

    /// The task being edited, or `None` in add mode.
    #[must_use]
    pub const fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    /// Applies one field change and clears that field's error.
    pub fn apply(&mut self, edit: FieldEdit) {
        self.errors.remove(&edit.field());
        match edit {
            FieldEdit::Text(text) => self.text = text,
            FieldEdit::Priority(priority) => self.priority = priority,
            FieldEdit::DueDate(due_date) => self.due_date = due_date,
            FieldEdit::Completed(completed) => self.completed = completed,
        }
    }

    /// Parses and applies a `{field, value}` pair.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the form is left unchanged.
    pub fn apply_raw(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let edit = FieldEdit::parse(field, value)?;
        self.apply(edit);
        Ok(())
    }

    /// Errors from the last [`validate`](Self::validate), by field.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<Field, FormError> {
        &self.errors
    }

    /// Checks every field, recording errors for display.
    ///
    /// # Errors
    ///
    /// Returns the first field error found.
    pub fn validate(&mut self) -> Result<(), FormError> {
        self.errors.clear();
        if self.text.trim().is_empty() {
            self.errors.insert(Field::Text, FormError::TextEmpty);
        } else if self.text.chars().count() > self.max_text_len {
            self.errors.insert(
                Field::Text,
                FormError::TextTooLong {
                    max: self.max_text_len,
                },
            );
        }
        self.errors
            .values()
            .next()
            .cloned()
            .map_or(Ok(()), Err)
    }

    /// Validates and returns a creation payload.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn to_draft(&mut self) -> Result<TaskDraft, FormError> {
        self.validate()?;
        Ok(TaskDraft {
            text: self.text.clone(),
            completed: self.completed,
            priority: self.priority,
            due_date: self.due_date,
        })
    }

    /// Validates and returns a full replacement for task `id`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn to_task(&mut self, id: TaskId) -> Result<Task, FormError> {
        self.to_draft().map(|draft| Task::from_draft(id, draft))
    }
}
