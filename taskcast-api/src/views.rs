//! Server-rendered HTML pages.
//!
//! Pages are assembled with `format!` around a shared layout. Every piece of
//! user-supplied text goes through [`escape`] before it reaches the markup.

use crate::{
    error::ValidationErrorDetail,
    forms::{messages_for, TaskForm, DATE_FORMAT},
    session::{PageContext, CSRF_FIELD},
};
use axum::{http::StatusCode, response::Html};
use std::fmt::Write;
use taskcast_shared::{
    models::task::{Task, LOCATION_MAX_LEN, TITLE_MAX_LEN},
    models::user::{USERNAME_MAX_LEN, USERNAME_MIN_LEN},
    weather::{WeatherInfo, WeatherSnapshot},
};

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem}.notice{padding:.5rem 1rem;margin:.5rem 0;border-radius:4px}\
.success{background:#d4edda}.info{background:#d1ecf1}.warning{background:#fff3cd}\
.danger{background:#f8d7da}.error{color:#a00;font-size:.9em}.done .title{text-decoration:line-through}\
.task{border-bottom:1px solid #ddd;padding:.75rem 0}.weather{color:#555}\
form.inline{display:inline}label{display:block;margin-top:.75rem}";

/// Escapes text for use in HTML content and quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Hidden form field echoing the session's token
fn csrf_input(page: &PageContext) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        CSRF_FIELD,
        escape(&page.csrf_token)
    )
}

fn layout(title: &str, page: &PageContext, body: &str) -> Html<String> {
    let account = match &page.username {
        Some(name) => format!(
            "<span>Signed in as {}</span> <a href=\"/logout\">Log out</a>",
            escape(name)
        ),
        None => "<a href=\"/login\">Log in</a><a href=\"/register\">Register</a>".to_string(),
    };

    let mut notices = String::new();
    for notice in &page.notices {
        let _ = write!(
            notices,
            "<div class=\"notice {}\">{}</div>",
            notice.level.as_str(),
            escape(&notice.message)
        );
    }

    let csrf_meta = if page.csrf_token.is_empty() {
        String::new()
    } else {
        format!("<meta name=\"csrf-token\" content=\"{}\">\n", escape(&page.csrf_token))
    };

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n{csrf_meta}\
         <title>{title} - Taskcast</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Tasks</a><a href=\"/new_task\">New task</a>{account}</nav>\n\
         {notices}\n<main>\n<h1>{title}</h1>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

fn weather_line(location: &str, snapshot: Option<&WeatherSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return format!(
            "<div class=\"weather\">{}: Weather unavailable</div>",
            escape(location)
        );
    };

    let mut parts = Vec::new();
    if let Some(t) = snapshot.temperature() {
        parts.push(format!("{:.1} °C", t));
    }
    if let Some(condition) = snapshot.condition() {
        parts.push(condition.description().to_string());
    }
    if let Some(w) = snapshot.windspeed() {
        parts.push(format!("wind {:.1} km/h", w));
    }
    if parts.is_empty() {
        parts.push("no current readings".to_string());
    }

    format!(
        "<div class=\"weather\">{}: {}</div>",
        escape(location),
        escape(&parts.join(", "))
    )
}

/// Task list with weather annotations
pub fn index(page: &PageContext, tasks: &[Task], weather: &WeatherInfo) -> Html<String> {
    if tasks.is_empty() {
        return layout(
            "Tasks",
            page,
            "<p>No tasks yet. <a href=\"/new_task\">Add one</a>.</p>",
        );
    }

    let mut body = String::from("<section class=\"tasks\">\n");
    for task in tasks {
        let class = if task.completed { "task done" } else { "task" };
        let _ = write!(
            body,
            "<article class=\"{class}\" id=\"task-{id}\">\n<div class=\"title\">{title}</div>\n",
            id = task.id,
            title = escape(&task.title),
        );
        if let Some(description) = &task.description {
            let _ = write!(body, "<p>{}</p>\n", escape(description));
        }
        if let Some(due) = task.due_date {
            let _ = write!(body, "<div class=\"due\">Due {}</div>\n", due.format(DATE_FORMAT));
        }
        if let Some(location) = task.weather_location() {
            let snapshot = weather.get(location).and_then(Option::as_ref);
            body.push_str(&weather_line(location, snapshot));
            body.push('\n');
        }
        let _ = write!(
            body,
            "<a href=\"/edit_task/{id}\">Edit</a>\n\
             <form class=\"inline\" method=\"post\" action=\"/delete_task/{id}\">{csrf}\
             <button type=\"submit\">Delete</button></form>\n</article>\n",
            id = task.id,
            csrf = csrf_input(page),
        );
    }
    body.push_str("</section>");

    layout("Tasks", page, &body)
}

fn field_errors(errors: &[ValidationErrorDetail], field: &str) -> String {
    messages_for(errors, field)
        .map(|m| format!("<div class=\"error\">{}</div>", escape(m)))
        .collect()
}

/// Create or edit form for a task
///
/// The completed checkbox is only offered when editing.
pub fn task_form(
    page: &PageContext,
    heading: &str,
    action: &str,
    form: &TaskForm,
    errors: &[ValidationErrorDetail],
    editing: bool,
) -> Html<String> {
    let completed = if editing {
        format!(
            "<label><input type=\"checkbox\" name=\"completed\"{}> Completed</label>\n",
            if form.is_completed() { " checked" } else { "" }
        )
    } else {
        String::new()
    };

    let body = format!(
        "<form method=\"post\" action=\"{action}\">\n{csrf}\n\
         <label>Title <input name=\"title\" maxlength=\"{title_max}\" value=\"{title}\"></label>\n{title_errors}\
         <label>Description <textarea name=\"description\">{description}</textarea></label>\n\
         <label>Due date <input type=\"date\" name=\"due_date\" placeholder=\"YYYY-MM-DD\" value=\"{due_date}\"></label>\n{due_errors}\
         <label>Location <input name=\"location\" maxlength=\"{location_max}\" value=\"{location}\"></label>\n{location_errors}\
         {completed}<button type=\"submit\">Save task</button>\n</form>",
        action = escape(action),
        csrf = csrf_input(page),
        title_max = TITLE_MAX_LEN,
        title = escape(&form.title),
        title_errors = field_errors(errors, "title"),
        description = escape(&form.description),
        due_date = escape(&form.due_date),
        due_errors = field_errors(errors, "due_date"),
        location_max = LOCATION_MAX_LEN,
        location = escape(&form.location),
        location_errors = field_errors(errors, "location"),
    );

    layout(heading, page, &body)
}

fn credentials_form(
    page: &PageContext,
    action: &str,
    button: &str,
    username: &str,
    errors: &[ValidationErrorDetail],
    hint: &str,
) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n{csrf}\n\
         <label>Username <input name=\"username\" value=\"{username}\"{hint}></label>\n{username_errors}\
         <label>Password <input type=\"password\" name=\"password\"></label>\n{password_errors}\
         <button type=\"submit\">{button}</button>\n</form>",
        csrf = csrf_input(page),
        username = escape(username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    )
}

/// Registration page
pub fn register_page(page: &PageContext, username: &str, errors: &[ValidationErrorDetail]) -> Html<String> {
    let hint = format!(
        " minlength=\"{}\" maxlength=\"{}\"",
        USERNAME_MIN_LEN, USERNAME_MAX_LEN
    );
    let body = credentials_form(page, "/register", "Register", username, errors, &hint);
    layout("Register", page, &body)
}

/// Login page
pub fn login_page(page: &PageContext, username: &str, errors: &[ValidationErrorDetail]) -> Html<String> {
    let body = credentials_form(page, "/login", "Log in", username, errors, "");
    layout("Log in", page, &body)
}

/// Standalone error page
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!("<p>{}</p>\n<p><a href=\"/\">Back to tasks</a></p>", escape(message));
    layout(title, &PageContext::default(), &body)
}
