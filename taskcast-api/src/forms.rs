/// Typed form input
///
/// Browsers submit `application/x-www-form-urlencoded` bodies in which every
/// field is a string. Each form here deserializes that raw shape, then its
/// `validate` method trims and checks it with `validator` and produces
/// either clean domain input or a list of field errors for redisplay.

use crate::error::ValidationErrorDetail;
use chrono::NaiveDate;
use serde::Deserialize;
use taskcast_shared::models::task::{CreateTask, Task, UpdateTask};
use validator::{Validate, ValidationErrors};

/// Date format accepted in the due date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "This field is required.";

/// Raw task form as submitted by the browser
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub due_date: String,

    #[serde(default)]
    pub location: String,

    /// Present (usually as `on`) only when the checkbox is ticked
    #[serde(default)]
    pub completed: Option<String>,

    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Validate)]
struct TaskInput {
    #[validate(
        required(message = "This field is required."),
        length(max = 80, message = "Title must be at most 80 characters.")
    )]
    title: Option<String>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters."))]
    location: Option<String>,
}

/// Validated task fields
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub completed: bool,
}

impl From<TaskFields> for CreateTask {
    fn from(fields: TaskFields) -> Self {
        CreateTask {
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            location: fields.location,
        }
    }
}

impl From<TaskFields> for UpdateTask {
    fn from(fields: TaskFields) -> Self {
        UpdateTask {
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            location: fields.location,
            completed: fields.completed,
        }
    }
}

impl TaskForm {
    /// Prefills the form from an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            location: task.location.clone().unwrap_or_default(),
            completed: task.completed.then(|| "on".to_string()),
            csrf_token: String::new(),
        }
    }

    /// Whether the completed checkbox is ticked
    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    /// Checks the form and converts it into task fields
    ///
    /// Title is required and limited to 80 characters; location to 100.
    /// An empty due date means "no due date"; anything else must be
    /// `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<TaskFields, Vec<ValidationErrorDetail>> {
        let input = TaskInput {
            title: non_empty(&self.title),
            location: non_empty(&self.location),
        };

        let mut errors = match input.validate() {
            Ok(()) => Vec::new(),
            Err(e) => validation_details(&e),
        };

        let due_date = match non_empty(&self.due_date) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(ValidationErrorDetail {
                        field: "due_date".to_string(),
                        message: "Not a valid date value (expected YYYY-MM-DD).".to_string(),
                    });
                    None
                }
            },
        };

        if !errors.is_empty() {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(errors);
        }

        Ok(TaskFields {
            title: input.title.unwrap_or_default(),
            description: non_empty(&self.description),
            due_date,
            location: input.location,
            completed: self.is_completed(),
        })
    }
}

/// Raw registration form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Validate)]
struct RegisterInput {
    #[validate(
        required(message = "This field is required."),
        length(
            min = 4,
            max = 80,
            message = "Username must be between 4 and 80 characters."
        )
    )]
    username: Option<String>,

    #[validate(required(message = "This field is required."))]
    password: Option<String>,
}

/// Raw login form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub csrf_token: String,
}

/// Body of the delete button's form, which carries only the token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Validate)]
struct LoginInput {
    #[validate(required(message = "This field is required."))]
    username: Option<String>,

    #[validate(required(message = "This field is required."))]
    password: Option<String>,
}

/// Validated username and password
///
/// The username is trimmed; the password is kept exactly as typed.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Credentials, Vec<ValidationErrorDetail>> {
        let input = RegisterInput {
            username: non_empty(&self.username),
            password: password_value(&self.password),
        };
        input.validate().map_err(|e| validation_details(&e))?;
        Ok(credentials(input.username, input.password))
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, Vec<ValidationErrorDetail>> {
        let input = LoginInput {
            username: non_empty(&self.username),
            password: password_value(&self.password),
        };
        input.validate().map_err(|e| validation_details(&e))?;
        Ok(credentials(input.username, input.password))
    }
}

/// Flattens `validator` errors into field/message pairs, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| REQUIRED.to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Messages for one field
pub fn messages_for<'a>(errors: &'a [ValidationErrorDetail], field: &'a str) -> impl Iterator<Item = &'a str> {
    errors
        .iter()
        .filter(move |e| e.field == field)
        .map(|e| e.message.as_str())
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Whitespace-only passwords count as missing, but real ones are not trimmed
fn password_value(raw: &str) -> Option<String> {
    (!raw.trim().is_empty()).then(|| raw.to_string())
}

fn credentials(username: Option<String>, password: Option<String>) -> Credentials {
    Credentials {
        username: username.unwrap_or_default(),
        password: password.unwrap_or_default(),
    }
}
