use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use pfegen_client::protocol::REQUEST_ID_HEADER;
use pfegen_client::{ClientError, ReportClient};
use pfegen_core::preview::DownloadLink;
use pfegen_core::ReportRequest;

#[derive(Clone, Default)]
struct ServerState {
    received: Arc<Mutex<Vec<(String, ReportRequest, Option<String>)>>>,
}

fn record(state: &ServerState, route: &str, headers: &HeaderMap, body: ReportRequest) {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .received
        .lock()
        .unwrap()
        .push((route.to_string(), body, request_id));
}

async fn generate(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<ReportRequest>,
) -> impl IntoResponse {
    record(&state, "/generate", &headers, body.clone());
    if body.supervisor.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Champ requis: supervisor"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "preview": {"introduction": format!("Intro {}", body.subject)},
            "pdf_url": "/static/rapports/Rapport_PFE_1.pdf",
            "filename": "Rapport_PFE_1.pdf",
            "metadata": {"department": "Génie Informatique", "order_id": "ENSA-OUD-2025-001"}
        })),
    )
}

async fn regenerate(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<ReportRequest>,
) -> impl IntoResponse {
    record(&state, "/regenerate", &headers, body);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html")],
        "<h1>Internal Server Error</h1>",
    )
}

async fn pdf() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        b"%PDF-1.4 fake".to_vec(),
    )
}

async fn spawn_server() -> anyhow::Result<(String, ServerState)> {
    let state = ServerState::default();
    let app = Router::new()
        .route("/generate", post(generate))
        .route("/regenerate", post(regenerate))
        .route("/static/rapports/Rapport_PFE_1.pdf", get(pdf))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn request(subject: &str, supervisor: &str) -> ReportRequest {
    ReportRequest {
        subject: subject.to_string(),
        description: "desc".to_string(),
        student_name: "Sara".to_string(),
        academic_year: "2024/2025".to_string(),
        supervisor: supervisor.to_string(),
        jury: "Pr. A".to_string(),
        framework: "STAR".to_string(),
    }
}

fn client(base_url: String) -> ReportClient {
    ReportClient::new(base_url, Duration::from_secs(5))
}

#[tokio::test]
async fn generate_posts_request_and_parses_success() -> anyhow::Result<()> {
    let (base_url, state) = spawn_server().await?;
    let result = client(base_url).generate(&request("X", "Pr. B")).await?;

    assert!(result.success);
    assert_eq!(
        result.preview.unwrap().introduction.as_deref(),
        Some("Intro X")
    );
    assert_eq!(result.filename.as_deref(), Some("Rapport_PFE_1.pdf"));
    assert_eq!(
        result.metadata.unwrap().order_id.as_deref(),
        Some("ENSA-OUD-2025-001")
    );

    let received = state.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "/generate");
    assert_eq!(received[0].1, request("X", "Pr. B"));
    assert!(received[0].2.as_deref().is_some_and(|id| !id.is_empty()));
    Ok(())
}

#[tokio::test]
async fn error_status_with_json_body_is_an_application_failure() -> anyhow::Result<()> {
    let (base_url, _state) = spawn_server().await?;
    let result = client(base_url).generate(&request("X", "")).await?;

    assert!(!result.success);
    assert_eq!(result.error_message(), Some("Champ requis: supervisor"));
    Ok(())
}

#[tokio::test]
async fn regenerate_hits_its_own_route_and_reports_unreadable_body() -> anyhow::Result<()> {
    let (base_url, state) = spawn_server().await?;
    let err = client(base_url)
        .regenerate(&request("Stored", "Pr. B"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode { status: 500, .. }));
    let received = state.received.lock().unwrap();
    assert_eq!(received[0].0, "/regenerate");
    assert_eq!(received[0].1.subject, "Stored");
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = client(format!("http://{addr}"))
        .generate(&request("X", "Pr. B"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    Ok(())
}

#[tokio::test]
async fn download_saves_pdf_under_sanitized_name() -> anyhow::Result<()> {
    let (base_url, _state) = spawn_server().await?;
    let dir = std::env::temp_dir().join(format!("pfegen-download-{}", std::process::id()));
    let link = DownloadLink {
        url: "/static/rapports/Rapport_PFE_1.pdf".to_string(),
        filename: "../escape/Rapport.pdf".to_string(),
    };

    let path = client(base_url).download(&link, &dir).await?;
    assert_eq!(path, dir.join("Rapport.pdf"));
    assert_eq!(std::fs::read(&path)?, b"%PDF-1.4 fake");

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn download_of_missing_pdf_fails() -> anyhow::Result<()> {
    let (base_url, _state) = spawn_server().await?;
    let link = DownloadLink {
        url: "/static/rapports/missing.pdf".to_string(),
        filename: "missing.pdf".to_string(),
    };
    let err = client(base_url)
        .download(&link, &std::env::temp_dir())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    Ok(())
}
