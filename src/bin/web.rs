//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use billiards_tournament_web::{
    cancel_match, close_round, create_round, delete_round, freeze_round, move_players,
    select_winner, set_winner_title, shuffle_round, start_match, start_tournament, Container,
    SkillLevel, Tournament, TournamentError, TournamentId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    name: String,
    email: String,
    #[serde(default)]
    skill_level: SkillLevel,
    #[serde(default)]
    profile_pic_url: Option<String>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    players: Vec<RegisterPlayerBody>,
}

#[derive(Deserialize)]
struct CreateRoundBody {
    display_name: String,
}

#[derive(Deserialize)]
struct MovePlayersBody {
    player_ids: Vec<Uuid>,
    source: Container,
    target: Container,
}

#[derive(Deserialize)]
struct SelectWinnerBody {
    player_id: Uuid,
}

#[derive(Deserialize)]
struct SetTitleBody {
    title: String,
}

/// One row of a CSV player import (headers: name,email,skill_level,profile_pic_url).
#[derive(Deserialize)]
struct ImportPlayerRecord {
    name: String,
    email: String,
    #[serde(default)]
    skill_level: Option<SkillLevel>,
    #[serde(default)]
    profile_pic_url: Option<String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and round id.
#[derive(Deserialize)]
struct TournamentRoundPath {
    id: TournamentId,
    round_id: Uuid,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

/// Path segments: tournament id and player id.
#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: Uuid,
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "billiards-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new tournament, optionally seeded with registered players
/// (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let mut tournament = Tournament::new();
    if let Some(body) = body {
        for p in &body.players {
            if let Err(e) = tournament.register_player(
                p.name.trim(),
                p.email.trim(),
                p.skill_level,
                p.profile_pic_url.clone(),
            ) {
                return bad_request(e);
            }
        }
    }
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(&g[&id].tournament)
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => not_found(),
    }
}

/// Register one player (before the tournament has started).
#[post("/api/tournaments/{id}/players")]
async fn api_register_player(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterPlayerBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.register_player(
        body.name.trim(),
        body.email.trim(),
        body.skill_level,
        body.profile_pic_url.clone(),
    ) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Bulk player import. Body is CSV text with headers
/// name,email,skill_level,profile_pic_url; the whole file is validated and
/// applied row by row, stopping at the first bad row.
#[post("/api/tournaments/{id}/players/import")]
async fn api_import_players(
    state: AppState,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let mut records: Vec<ImportPlayerRecord> = Vec::new();
    for row in reader.deserialize() {
        match row {
            Ok(rec) => records.push(rec),
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({ "error": format!("Bad CSV row: {e}") }))
            }
        }
    }

    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    for rec in records {
        if let Err(e) = t.register_player(
            rec.name.trim(),
            rec.email.trim(),
            rec.skill_level.unwrap_or_default(),
            rec.profile_pic_url,
        ) {
            return bad_request(e);
        }
    }
    log::info!("Imported players into tournament {}", t.id);
    HttpResponse::Ok().json(t)
}

/// Start the tournament: creates the first round seeded with all players.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match start_tournament(t) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Create a new round with an organizer-assigned display name.
#[post("/api/tournaments/{id}/rounds")]
async fn api_create_round(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreateRoundBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match create_round(t, &body.display_name) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Freeze a completed round (irreversible).
#[post("/api/tournaments/{id}/rounds/{round_id}/freeze")]
async fn api_freeze_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match freeze_round(t, path.round_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Delete the last round of the bracket (must be empty).
#[delete("/api/tournaments/{id}/rounds/{round_id}")]
async fn api_delete_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match delete_round(t, path.round_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Close (remove) an empty round at any position.
#[post("/api/tournaments/{id}/rounds/{round_id}/close")]
async fn api_close_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match close_round(t, path.round_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Select a round tab.
#[put("/api/tournaments/{id}/rounds/{round_id}/select")]
async fn api_select_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.round(path.round_id) {
        Ok(_) => {
            t.selected_round = Some(path.round_id);
            HttpResponse::Ok().json(t)
        }
        Err(e) => bad_request(e),
    }
}

/// Pair the round's unmatched players into new pending matches.
#[post("/api/tournaments/{id}/rounds/{round_id}/shuffle")]
async fn api_shuffle_round(state: AppState, path: Path<TournamentRoundPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match shuffle_round(t, path.round_id) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Move selected players between containers (dashboard / round lists).
#[post("/api/tournaments/{id}/players/move")]
async fn api_move_players(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<MovePlayersBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match move_players(t, &body.player_ids, body.source, body.target) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Start a pending match.
#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match start_match(t, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Select (or change) the winner of a match.
#[put("/api/tournaments/{id}/matches/{match_id}/winner")]
async fn api_select_winner(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<SelectWinnerBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match select_winner(t, path.match_id, body.player_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Cancel a not-yet-completed match.
#[delete("/api/tournaments/{id}/matches/{match_id}")]
async fn api_cancel_match(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match cancel_match(t, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    }
}

/// Current winner ledger (rank-ordered, one entry per player).
#[get("/api/tournaments/{id}/standings")]
async fn api_get_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament.winners_to_display)
        }
        None => not_found(),
    }
}

/// Set the organizer-assigned title on a ledger entry.
#[put("/api/tournaments/{id}/standings/{player_id}/title")]
async fn api_set_winner_title(
    state: AppState,
    path: Path<TournamentPlayerPath>,
    body: Json<SetTitleBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match set_winner_title(t, path.player_id, &body.title) {
        Ok(()) => HttpResponse::Ok().json(&t.winners_to_display),
        Err(e) => bad_request(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_register_player)
            .service(api_import_players)
            .service(api_start_tournament)
            .service(api_create_round)
            .service(api_freeze_round)
            .service(api_delete_round)
            .service(api_close_round)
            .service(api_select_round)
            .service(api_shuffle_round)
            .service(api_move_players)
            .service(api_start_match)
            .service(api_select_winner)
            .service(api_cancel_match)
            .service(api_get_standings)
            .service(api_set_winner_title)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
