use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use editor::{Outcome, Workbench};
use serde::Deserialize;
use types::{DayOfWeek, Lesson, Rejection, Snapshot, SubjectId, TimeOfDay, ViewContext};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SessionIn {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PlaceIn {
    pub subject_id: SubjectId,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub view: ViewContext,
}

#[derive(Deserialize, ToSchema)]
pub struct MoveIn {
    pub lesson_id: i64,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteIn {
    pub lesson_id: i64,
}

#[derive(serde::Serialize, ToSchema)]
pub struct EditOut {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson: Option<Lesson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Outcome> for EditOut {
    fn from(out: Outcome) -> Self {
        match out {
            Outcome::Accepted(lesson) => EditOut {
                accepted: true,
                lesson: Some(lesson),
                rejection: None,
                message: None,
            },
            Outcome::Rejected(r) => EditOut {
                accepted: false,
                lesson: None,
                message: Some(r.to_string()),
                rejection: Some(r),
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/sessions",
    request_body = SessionIn,
    responses((status = 200, description = "Editing session opened", body = SessionCreated))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<SessionIn>,
) -> Result<Json<SessionCreated>, ApiError> {
    let wb = Workbench::new(input.snapshot, input.lessons)?;
    let id = state.sessions.open(wb);
    Ok(Json(SessionCreated { session_id: id }))
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/lessons",
    params(("id" = String, Path, description = "Session ID")),
    responses((status = 200, description = "Current lesson list", body = [Lesson]))
)]
pub async fn lessons(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::not_found("unknown session"))?;
    let wb = session.lock().await;
    Ok(Json(wb.lessons().to_vec()))
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/place",
    params(("id" = String, Path, description = "Session ID")),
    request_body = PlaceIn,
    responses((status = 200, description = "Placement outcome", body = EditOut))
)]
pub async fn place(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PlaceIn>,
) -> Result<Json<EditOut>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::not_found("unknown session"))?;
    let mut wb = session.lock().await;
    let out = wb.try_place(&input.subject_id, input.day, input.start, &input.view)?;
    Ok(Json(out.into()))
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/move",
    params(("id" = String, Path, description = "Session ID")),
    request_body = MoveIn,
    responses((status = 200, description = "Move outcome", body = EditOut))
)]
pub async fn move_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MoveIn>,
) -> Result<Json<EditOut>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::not_found("unknown session"))?;
    let mut wb = session.lock().await;
    let out = wb.try_move(input.lesson_id, input.day, input.start)?;
    Ok(Json(out.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}",
    params(("id" = String, Path, description = "Session ID")),
    responses((status = 200, description = "Session closed"))
)]
pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.sessions.close(&id) {
        return Err(ApiError::not_found("unknown session"));
    }
    Ok(Json(serde_json::json!({"closed": true})))
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/delete",
    params(("id" = String, Path, description = "Session ID")),
    request_body = DeleteIn,
    responses((status = 200, description = "Lesson removed"))
)]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DeleteIn>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::not_found("unknown session"))?;
    let mut wb = session.lock().await;
    wb.try_delete(input.lesson_id);
    Ok(Json(serde_json::json!({"deleted": true})))
}
