/// Task endpoints
///
/// - `GET /` - Task list with weather
/// - `GET,POST /new_task` - Create a task
/// - `GET,POST /edit_task/:id` - Edit a task
/// - `POST /delete_task/:id` - Delete a task
///
/// Successful mutations queue a notice and redirect (303) to the list.
/// Invalid submissions re-render the form with field errors and status 200.
/// Unknown task IDs, including ones that are not integers, answer 404.
/// Every POST must echo the session's CSRF token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    forms::{DeleteForm, TaskForm},
    session::{NoticeLevel, SessionContext},
    views,
};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

/// Parses the `:id` path segment
///
/// Anything that is not an `i64` names no task, so it is a 404 like any
/// other unknown ID.
pub fn parse_task_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("Task {} not found", raw)))
}

/// Lists all tasks, annotated with current weather at their locations
///
/// Weather is looked up once per distinct location on every render; a
/// failed lookup only marks that location's weather as unavailable.
pub async fn list_tasks(
    State(state): State<AppState>,
    session: SessionContext,
) -> ApiResult<Html<String>> {
    let tasks = state.tasks.list_all().await?;
    let weather = state.weather.enrich(&tasks).await;
    let page = session.page(state.users.as_ref()).await?;

    Ok(views::index(&page, &tasks, &weather))
}

/// Empty create form
pub async fn new_task_form(
    State(state): State<AppState>,
    session: SessionContext,
) -> ApiResult<Html<String>> {
    let page = session.page(state.users.as_ref()).await?;
    Ok(views::task_form(&page, "New task", "/new_task", &TaskForm::default(), &[], false))
}

/// Creates a task from the submitted form
pub async fn create_task(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<TaskForm>,
) -> ApiResult<Response> {
    session.verify_csrf(&form.csrf_token).await?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = session.page(state.users.as_ref()).await?;
            return Ok(
                views::task_form(&page, "New task", "/new_task", &form, &errors, false).into_response(),
            );
        }
    };

    let task = state.tasks.create(fields.into()).await?;
    tracing::info!(task_id = task.id, "Task created");

    session.notify(NoticeLevel::Success, "Task added successfully!").await?;
    Ok(Redirect::to("/").into_response())
}

/// Edit form prefilled from the stored task
pub async fn edit_task_form(
    State(state): State<AppState>,
    session: SessionContext,
    Path(raw_id): Path<String>,
) -> ApiResult<Html<String>> {
    let id = parse_task_id(&raw_id)?;
    let task = state.tasks.get_by_id(id).await?;
    let page = session.page(state.users.as_ref()).await?;

    Ok(views::task_form(
        &page,
        "Edit task",
        &format!("/edit_task/{}", id),
        &TaskForm::from_task(&task),
        &[],
        true,
    ))
}

/// Replaces a task's fields from the submitted form
pub async fn update_task(
    State(state): State<AppState>,
    session: SessionContext,
    Path(raw_id): Path<String>,
    Form(form): Form<TaskForm>,
) -> ApiResult<Response> {
    let id = parse_task_id(&raw_id)?;
    session.verify_csrf(&form.csrf_token).await?;

    // Unknown IDs are a 404 even when the submission is invalid
    state.tasks.get_by_id(id).await?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = session.page(state.users.as_ref()).await?;
            let action = format!("/edit_task/{}", id);
            return Ok(views::task_form(&page, "Edit task", &action, &form, &errors, true).into_response());
        }
    };

    state.tasks.update(id, fields.into()).await?;
    tracing::info!(task_id = id, "Task updated");

    session.notify(NoticeLevel::Success, "Task updated successfully!").await?;
    Ok(Redirect::to("/").into_response())
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    session: SessionContext,
    Path(raw_id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> ApiResult<Redirect> {
    let id = parse_task_id(&raw_id)?;
    session.verify_csrf(&form.csrf_token).await?;

    state.tasks.delete(id).await?;
    tracing::info!(task_id = id, "Task deleted");

    session.notify(NoticeLevel::Info, "Task deleted successfully!").await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("42").unwrap(), 42);

        for raw in ["abc", "4.2", "", "99999999999999999999"] {
            let err = parse_task_id(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::NOT_FOUND, "{:?}", raw);
        }
    }
}
