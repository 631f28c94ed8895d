use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::room_registry::RoomRegistry;
use crate::round_timer::RoundTimers;
use crate::websocket::ConnectionManager;
use wordroom_core::IdentityProvider;
use wordroom_types::{ErrorKind, RoomError};

pub mod config;
pub mod room_registry;
pub mod round_timer;
pub mod websocket;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentRequest {
    #[serde(default)]
    student_id: String,
}

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<RoomRegistry>,
    timers: RoundTimers,
    identity: Arc<dyn IdentityProvider>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let registry_filter = warp::any().map({
        let registry = registry.clone();
        move || registry.clone()
    });

    let timers_filter = warp::any().map({
        let timers = timers.clone();
        move || timers.clone()
    });

    let identity_filter = warp::any().map({
        let identity = identity.clone();
        move || identity.clone()
    });

    let json_body = warp::body::content_length_limit(16 * 1024).and(warp::body::json());

    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(registry_filter.clone())
        .and(timers_filter)
        .and(identity_filter.clone())
        .map(
            |ws: warp::ws::Ws, conn_mgr, registry, timers, identity| {
                ws.on_upgrade(move |socket| {
                    websocket::handle_connection(socket, conn_mgr, registry, timers, identity)
                })
            },
        );

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| {
            warp::reply::json(&serde_json::json!({
                "status": "ok",
                "message": "Server is running"
            }))
        });

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(json_body.clone())
        .and(identity_filter.clone())
        .map(handle_login);

    let admin_check = warp::path!("api" / "auth" / "admin" / String)
        .and(warp::get())
        .and(identity_filter.clone())
        .map(handle_admin_check);

    let create_room = warp::path!("api" / "rooms" / "create")
        .and(warp::post())
        .and(json_body)
        .and(registry_filter.clone())
        .and(identity_filter)
        .map(handle_create_room);

    let room_info = warp::path!("api" / "rooms" / String)
        .and(warp::get())
        .and(registry_filter.clone())
        .and_then(handle_room_info);

    let leaderboard = warp::path!("api" / "rooms" / String / "leaderboard")
        .and(warp::get())
        .and(registry_filter)
        .and_then(handle_leaderboard);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    websocket
        .or(health)
        .or(login)
        .or(admin_check)
        .or(create_room)
        .or(leaderboard)
        .or(room_info)
        .with(cors)
        .with(warp::log("wordroom"))
}

fn status_for(error: &RoomError) -> StatusCode {
    match error.kind() {
        ErrorKind::Validation | ErrorKind::LengthMismatch => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::StateConflict => StatusCode::CONFLICT,
    }
}

fn error_reply(error: RoomError) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "success": false,
            "message": error.to_string()
        })),
        status_for(&error),
    )
}

fn handle_login(
    request: StudentRequest,
    identity: Arc<dyn IdentityProvider>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    let student_id = request.student_id.trim();
    if student_id.is_empty() {
        return error_reply(RoomError::invalid("Student ID is required"));
    }

    match identity.find_by_id(student_id) {
        Some(student) => {
            tracing::info!("Student {} logged in", student.id);
            warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "success": true,
                    "student": student
                })),
                StatusCode::OK,
            )
        }
        None => error_reply(RoomError::StudentNotFound {
            student_id: student_id.to_string(),
        }),
    }
}

fn handle_admin_check(
    student_id: String,
    identity: Arc<dyn IdentityProvider>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "success": true,
            "isAdmin": identity.is_admin(&student_id)
        })),
        StatusCode::OK,
    )
}

fn handle_create_room(
    request: StudentRequest,
    registry: Arc<RoomRegistry>,
    identity: Arc<dyn IdentityProvider>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    let student_id = request.student_id.trim();
    if student_id.is_empty() {
        return error_reply(RoomError::invalid("Student ID is required"));
    }
    if !identity.is_admin(student_id) {
        return error_reply(RoomError::Forbidden {
            action: "create rooms".to_string(),
        });
    }

    let room = registry.create(student_id);
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "success": true,
            "room": room
        })),
        StatusCode::CREATED,
    )
}

async fn handle_room_info(
    code: String,
    registry: Arc<RoomRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match registry.get(&code).await {
        Ok(room) => warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "success": true,
                "room": room
            })),
            StatusCode::OK,
        ),
        Err(e) => error_reply(e),
    })
}

async fn handle_leaderboard(
    code: String,
    registry: Arc<RoomRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match registry.leaderboard(&code).await {
        Ok(leaderboard) => warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "success": true,
                "leaderboard": leaderboard
            })),
            StatusCode::OK,
        ),
        Err(e) => error_reply(e),
    })
}
