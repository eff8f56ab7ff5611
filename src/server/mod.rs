//! HTTP service wrapper
//!
//! Thin glue over the research core: a POST endpoint that turns a free-text
//! company query into cleaned research results, plus a health check. CORS is
//! wide open and every request is traced.

use crate::config::Config;
use crate::crawler::{Orchestrator, SiteResult};
use crate::documents::DocumentText;
use crate::output::clean_text;
use crate::seed;
use crate::{DossierError, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
    max_seed_urls: usize,
}

#[derive(Debug, Deserialize)]
struct ResearchRequest {
    query: String,
}

#[derive(Serialize)]
struct ResearchResponse {
    status: &'static str,
    query: String,
    result: Vec<SiteResult>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Builds the Axum application router
pub fn build_app(config: Config) -> Result<Router> {
    let max_seed_urls = config.seeds.max_urls;
    let orchestrator = Arc::new(Orchestrator::new(config)?);
    let state = AppState {
        orchestrator,
        max_seed_urls,
    };

    // Allow any origin; the service carries no credentials or sessions
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/research", post(research_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Binds the listener and serves the application until shutdown
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.server.bind_addr.clone();
    let app = build_app(config)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| DossierError::Server(format!("failed to bind {addr}: {err}")))?;
    tracing::info!(addr = %addr, "Service listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| DossierError::Server(err.to_string()))?;
    Ok(())
}

/// Research endpoint
///
/// Generates seed URLs from the query, runs the orchestrator, and returns
/// cleaned results in a status envelope. Core errors collapse into a
/// generic failure response; kinds are not distinguished to the caller.
async fn research_handler(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> std::result::Result<Json<ResearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let seeds = seed::generate(&request.query, state.max_seed_urls);
    tracing::info!(query = %request.query, seeds = seeds.len(), "Research request");

    match state.orchestrator.research(&seeds).await {
        Ok(mut results) => {
            for site in &mut results {
                clean_site(site);
            }
            Ok(Json(ResearchResponse {
                status: "success",
                query: request.query,
                result: results,
            }))
        }
        Err(err) => {
            tracing::error!(query = %request.query, error = %err, "Research request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    status: "error",
                    message: "research failed".to_string(),
                }),
            ))
        }
    }
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Cleans narrative and extracted document text in place
///
/// Structured fields (headings, tables, lists) are element-scoped already
/// and pass through untouched.
fn clean_site(site: &mut SiteResult) {
    for page in &mut site.pages {
        page.text = clean_text(&page.text);
    }
    for document in &mut site.documents {
        if let DocumentText::Extracted(text) = &document.text {
            document.text = DocumentText::Extracted(clean_text(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_app(Config::default()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_empty_query_maps_to_error_envelope() {
        // An empty query produces no seeds, which the core rejects
        let request = Request::post("/research")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query": ""}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["message"].is_string());
    }

    #[test]
    fn test_clean_site_scrubs_narrative_and_document_text() {
        use crate::documents::DocumentRecord;
        use crate::extract::extract_page;
        use url::Url;

        let url = Url::parse("https://acme.com/").unwrap();
        let mut site = SiteResult {
            seed_url: url.clone(),
            pages: vec![extract_page("<p>spaced    out   *text*</p>", &url)],
            documents: vec![DocumentRecord {
                source_url: Url::parse("https://acme.com/a.txt").unwrap(),
                format: Some(crate::documents::DocumentFormat::Txt),
                storage_location: "downloads/a.txt".into(),
                text: DocumentText::Extracted("tab\tand\n\nnewline".to_string()),
            }],
        };

        clean_site(&mut site);

        assert_eq!(site.pages[0].text, "spaced out text");
        match &site.documents[0].text {
            DocumentText::Extracted(text) => assert_eq!(text, "tab and newline"),
            other => panic!("expected extracted text, got {other:?}"),
        }
    }
}
