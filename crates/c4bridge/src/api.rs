use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::engine::Command;
use crate::engine::Engine;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

#[derive(Serialize)]
struct CommandResponse {
    entity_id: String,
    command: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    version: &'static str,
    engine: Arc<Engine>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/state
#[tracing::instrument(skip(state))]
async fn entity_states(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.engine.state_snapshot();
    (StatusCode::OK, Json(crate::engine::State::clone(&snapshot)))
}

/// Handler for POST /v1/entities/:entity_id/command
#[tracing::instrument(skip(state, command))]
async fn entity_command(
    State(state): State<Arc<AppState>>,
    Path(entity_id): Path<String>,
    Json(command): Json<Command>,
) -> Response {
    let name = command.name();
    match state.engine.send_entity_command(entity_id.clone(), command) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(CommandResponse {
                entity_id,
                command: name,
            }),
        )
            .into_response(),
        Err(e) => {
            let not_found = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
            let status = if not_found {
                StatusCode::NOT_FOUND
            } else {
                tracing::warn!("Failed to route {} to {}: {}", name, entity_id, e);
                StatusCode::SERVICE_UNAVAILABLE
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/state", get(entity_states))
        .route("/v1/entities/:entity_id/command", post(entity_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Runs until `shutdown_rx` fires or the sender is dropped.
pub async fn serve(
    listen: IpAddr,
    port: u16,
    engine: Arc<Engine>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState { version, engine });
    let app = create_router(state);

    let addr = SocketAddr::new(listen, port);
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::engine::EntityState;
    use crate::engine::FromIntegrationMessage;
    use crate::engine::FromIntegrationSender;
    use crate::engine::Integration;
    use crate::engine::LightState;
    use crate::engine::ToIntegrationMessage;

    /// Announces one light and accepts any command for it
    struct OneLight;

    #[async_trait]
    impl Integration for OneLight {
        fn name(&self) -> &str {
            "one_light"
        }

        async fn setup(&mut self, tx: FromIntegrationSender) -> Result<(), Box<dyn Error + Send>> {
            let messages = [
                FromIntegrationMessage::EntityDiscovered {
                    entity_id: "light.hall".to_string(),
                    integration_name: "one_light".to_string(),
                },
                FromIntegrationMessage::StateChanged {
                    entity_id: "light.hall".to_string(),
                    state: EntityState::Light(LightState {
                        on: Some(true),
                        brightness: Some(200),
                    }),
                },
            ];
            for msg in messages {
                tx.send(msg)
                    .await
                    .map_err(|e| -> Box<dyn Error + Send> { Box::new(e) })?;
            }
            Ok(())
        }

        async fn handle_message(
            &mut self,
            _msg: ToIntegrationMessage,
        ) -> Result<(), Box<dyn Error + Send>> {
            Ok(())
        }

        async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
            Ok(())
        }
    }

    async fn router_with_light() -> Router {
        let mut engine = Engine::new();
        engine.register_integration("one_light".to_string(), Box::new(OneLight));
        let engine = Arc::new(engine);

        let runner = engine.clone();
        tokio::spawn(async move {
            let _ = runner.run().await;
        });

        for _ in 0..200 {
            if engine.state_snapshot().lights.contains_key("light.hall") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        create_router(Arc::new(AppState {
            version: "test",
            engine,
        }))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn command_request(entity_id: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/v1/entities/{entity_id}/command"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = create_router(Arc::new(AppState {
            version: "test",
            engine: Arc::new(Engine::new()),
        }));

        let response = app
            .oneshot(Request::get("/v1/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_info_reports_version() {
        let app = create_router(Arc::new(AppState {
            version: "1.2.3",
            engine: Arc::new(Engine::new()),
        }));

        let response = app
            .oneshot(Request::get("/v1/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["version"], "1.2.3");
        assert!(json["hostname"].is_string());
    }

    #[tokio::test]
    async fn test_state() {
        let app = router_with_light().await;

        let response = app
            .oneshot(Request::get("/v1/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        insta::assert_snapshot!(serde_json::to_string_pretty(&json).unwrap(), @r#"
        {
          "alarm_panels": {},
          "climates": {},
          "lights": {
            "light.hall": {
              "brightness": 200,
              "on": true
            }
          },
          "media_players": {}
        }
        "#);
    }

    #[tokio::test]
    async fn test_command_accepted() {
        let app = router_with_light().await;

        let response = app
            .oneshot(command_request(
                "light.hall",
                r#"{"command": "turn_on", "brightness": 10}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            body_string(response).await,
            r#"{"entity_id":"light.hall","command":"turn_on"}"#
        );
    }

    #[tokio::test]
    async fn test_command_for_unknown_entity() {
        let app = router_with_light().await;

        let response = app
            .oneshot(command_request("light.attic", r#"{"command": "turn_off"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("light.attic"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_rejected() {
        let app = router_with_light().await;

        let response = app
            .oneshot(command_request("light.hall", r#"{"command": "explode"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
