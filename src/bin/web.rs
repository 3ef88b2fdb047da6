//! Single binary web server: bracket engine REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT; engine settings BYE_POLICY, CONFLICT_RETRIES, BRACKET_SEED.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine_web::{
    BracketService, ChannelSink, EngineConfig, LogSink, MemoryStore, NotificationSink,
    ParticipantRef, ServerConfig, TournamentError, TournamentFormat, TournamentId,
    TournamentStatus,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

type AppState = Data<BracketService<MemoryStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default = "default_max_participants")]
    max_participants: u32,
}

fn default_max_participants() -> u32 {
    64
}

#[derive(Deserialize)]
struct SetStatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct EnrollBody {
    username: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    score_a: i64,
    score_b: i64,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: Uuid,
}

/// Map engine errors to user-visible JSON: 404 missing, 409 retryable conflict, 500 storage, else 400.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_) | TournamentError::MatchNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        TournamentError::ConcurrencyConflict => HttpResponse::Conflict().json(body),
        TournamentError::Storage(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine-web",
    })
}

/// Create a tournament (registration open).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    respond(state.create_tournament(&body.name, body.format, body.max_participants))
}

/// All tournaments, newest first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    respond(state.store().tournaments())
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.tournament(path.id))
}

/// Operator status change: registration-open -> upcoming -> live.
#[put("/api/tournaments/{id}/status")]
async fn api_set_status(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SetStatusBody>,
) -> HttpResponse {
    respond(state.set_status(path.id, body.status))
}

/// Enroll one confirmed participant (registration must be open).
#[post("/api/tournaments/{id}/participants")]
async fn api_enroll(state: AppState, path: Path<TournamentPath>, body: Json<EnrollBody>) -> HttpResponse {
    let body = body.into_inner();
    let username = body.username.trim();
    if username.is_empty() {
        return error_response(TournamentError::InvalidRoster("username is required".into()));
    }
    let mut participant = ParticipantRef::new(username);
    if let Some(avatar) = body.avatar_url.filter(|a| !a.trim().is_empty()) {
        participant = participant.with_avatar(avatar);
    }
    respond(state.enroll(path.id, participant))
}

/// Enroll participants from a CSV body with a `username[,avatar_url]` header.
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_roster(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    respond(state.import_roster(path.id, body.as_bytes()))
}

/// Generate the bracket (tournament must be live, Bracket format, not yet generated).
#[post("/api/tournaments/{id}/bracket/generate")]
async fn api_generate_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.generate(path.id))
}

/// Matches grouped by round, for rendering.
#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.bracket(path.id))
}

/// Round bookkeeping: bump current_round if the round is finished.
#[post("/api/tournaments/{id}/advance-round")]
async fn api_advance_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.advance_round(path.id))
}

/// Report a final score for a pending match.
#[post("/api/matches/{id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    respond(state.report_result(path.id, body.score_a, body.score_b))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server = ServerConfig::from_env();
    let engine = EngineConfig::from_env();
    log::info!(
        "Starting server at http://{}:{} (bye policy {}, {} conflict retries)",
        server.host,
        server.port,
        engine.bye_policy,
        engine.conflict_retries
    );

    // Background task: drain bracket events and hand them to the log sink
    let (sink, mut events) = ChannelSink::channel();
    actix_web::rt::spawn(async move {
        while let Some(event) = events.recv().await {
            LogSink.notify(event);
        }
    });

    let state = Data::new(BracketService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(sink),
        engine,
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_set_status)
            .service(api_enroll)
            .service(api_import_roster)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_advance_round)
            .service(api_report_result)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
