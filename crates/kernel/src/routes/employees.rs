//! Employee grid and CRUD routes.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router, body::Bytes};

use crate::error::{AppError, AppResult};
use crate::grid::{GridResponse, Payload};
use crate::models::{Employee, UpdateEmployee};
use crate::state::AppState;

/// Create the employees router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", post(employee_grid))
        .route(
            "/api/employee/{id}",
            axum::routing::put(update_employee).delete(delete_employee),
        )
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

/// Grid endpoint. Accepts form-encoded or JSON bodies and always answers
/// 200 with a well-formed result page; failures are carried in the
/// page's `error` field, never as an HTTP error status.
async fn employee_grid(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<GridResponse> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let payload = match Payload::from_bytes(content_type, &body) {
        Ok(payload) => payload,
        Err(e) => {
            // The body never parsed, so no token could be recovered;
            // fall back to 0 rather than hanging the client.
            tracing::warn!(error = %e, "unparseable grid request body");
            return Json(GridResponse::error(0, e.to_string()));
        }
    };

    let page = state
        .employee_grid()
        .process(state.employee_source(), &payload)
        .await;

    Json(page)
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    let employee = Employee::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(employee))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if Employee::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
