mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod sessions;
    pub mod validate;
}

use axum::{
    routing::{delete, get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::generate::generate,
            routes::jobs::status,
            routes::jobs::result,
            routes::validate::validate_handler,
            routes::sessions::create,
            routes::sessions::close,
            routes::sessions::lessons,
            routes::sessions::place,
            routes::sessions::move_lesson,
            routes::sessions::delete_lesson,
        ),
        components(schemas(
            types::Snapshot, types::SchoolConfig, types::Grade, types::Class, types::Subject,
            types::Teacher, types::Room, types::Student, types::LessonRequirement,
            types::TeacherAssignment, types::TeacherConstraint, types::SubjectRule,
            types::Lesson, types::LessonOwner, types::Diagnostic, types::DiagnosticReason,
            types::Rejection, types::ViewContext, types::DayOfWeek, types::DayPart,
            types::TimeOfDay, types::GenerateParams, types::GenerateRequest,
            types::GenerateOutcome,
            types::ClassId, types::SubjectId, types::TeacherId, types::RoomId,
            types::StudentId, types::GradeId,
            jobs::JobId, jobs::JobStatus,
            routes::generate::JobCreated,
            routes::validate::ValidationReport,
            routes::sessions::SessionIn,
            routes::sessions::SessionCreated,
            routes::sessions::PlaceIn,
            routes::sessions::MoveIn,
            routes::sessions::DeleteIn,
            routes::sessions::EditOut
        )),
        tags(
            (name = "timetable", description = "School timetable API")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/sessions", post(routes::sessions::create))
        .route("/v1/sessions/:id", delete(routes::sessions::close))
        .route("/v1/sessions/:id/lessons", get(routes::sessions::lessons))
        .route("/v1/sessions/:id/place", post(routes::sessions::place))
        .route("/v1/sessions/:id/move", post(routes::sessions::move_lesson))
        .route("/v1/sessions/:id/delete", post(routes::sessions::delete_lesson))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(app_state);

    let port = std::env::var("TIMETABLE__SERVER__PORT").unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .expect("invalid listen addr");
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
