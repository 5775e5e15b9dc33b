//! Recap HTTP Server
//!
//! Actix-web 기반 요약 폼 페이지와 JSON API

pub mod form;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use recap_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use pipeline::{Pipeline, SummarizeRequest, SummaryOutcome};
pub use state::AppState;

/// Start the HTTP server and run until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_address = config.server_bind_address();
    let state = Arc::new(AppState::new(config)?);

    info!("Starting HTTP server on {}", bind_address);
    info!(
        "Models: {} (standard), {} (advanced)",
        state.config.standard_model, state.config.advanced_model
    );

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use async_trait::async_trait;
    use recap_common::RecapError;
    use recap_llm::{
        ChatRequest, ClientFactory, Credentials, LlmClient, PromptLibrary, TokenCounter,
    };
    use recap_loader::{DocumentLoader, TranscriptFetcher};
    use std::path::Path;

    const BOUNDARY: &str = "recap-test-boundary";

    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    struct StandardOnly;

    #[async_trait]
    impl LlmClient for StandardOnly {
        async fn chat(&self, request: ChatRequest) -> recap_common::Result<String> {
            Ok(format!("- {}", request.prompt().len()))
        }

        async fn embed(&self, _model: &str, inputs: &[String]) -> recap_common::Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|_| vec![1.0]).collect())
        }

        async fn list_models(&self) -> recap_common::Result<Vec<String>> {
            Ok(vec!["gpt-3.5-turbo".to_string()])
        }
    }

    struct StubClients;

    impl ClientFactory for StubClients {
        fn connect(&self, _credentials: &Credentials) -> recap_common::Result<Arc<dyn LlmClient>> {
            Ok(Arc::new(StandardOnly))
        }
    }

    struct NoTranscripts;

    #[async_trait]
    impl TranscriptFetcher for NoTranscripts {
        async fn fetch(&self, _video_id: &str) -> recap_common::Result<String> {
            Err(RecapError::external("transcript", "unavailable"))
        }
    }

    fn test_state(upload_dir: &Path) -> Arc<AppState> {
        test_state_with(AppConfig {
            upload_dir: upload_dir.to_path_buf(),
            ..AppConfig::default()
        })
    }

    fn test_state_with(config: AppConfig) -> Arc<AppState> {
        let config = Arc::new(config);
        let pipeline = Pipeline::new(
            config.clone(),
            Arc::new(StubClients),
            DocumentLoader::new(Arc::new(NoTranscripts)),
            Arc::new(WordCounter),
            Arc::new(PromptLibrary::builtin().unwrap()),
        );
        Arc::new(AppState::with_pipeline(config, pipeline).unwrap())
    }

    /// multipart/form-data body from (name, filename, content) parts
    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn post_form(uri: &str, body: String) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_index_shows_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("name=\"video_url\""));
        assert!(html.contains("name=\"file\""));
    }

    #[actix_web::test]
    async fn test_api_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let body = multipart(&[("api_key", None, "sk-abcdef"), ("video_url", None, "  ")]);
        let resp = test::call_service(&app, post_form("/api/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "missing_input");
        assert_eq!(json["warning"], "Please upload a file or enter a YouTube URL.");
    }

    #[actix_web::test]
    async fn test_api_too_small_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let body = multipart(&[
            ("api_key", None, "sk-abcdef"),
            ("file", Some("notes.txt"), "far too short"),
        ]);
        let resp = test::call_service(&app, post_form("/api/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["warning"], "File or transcript too small!");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_api_success() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let text = words(2000);
        let body = multipart(&[
            ("api_key", None, "sk-abcdef"),
            ("file", Some("notes.md"), text.as_str()),
        ]);
        let resp = test::call_service(&app, post_form("/api/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["chunks_total"], 10);
        assert_eq!(json["chunks_summarized"], 10);
        assert_eq!(json["source"]["kind"], "file");
        assert!(json["summary_html"].as_str().unwrap().contains("<li>"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_page_shows_warning_for_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let body = multipart(&[
            ("api_key", None, "sk-abcdef"),
            ("file", Some("movie.mp4"), "binary"),
        ]);
        let resp = test::call_service(&app, post_form("/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("class=\"warning\""));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_api_bad_key_wins_over_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .configure(routes::configure),
        )
        .await;

        let body = multipart(&[
            ("api_key", None, "not a key"),
            ("file", Some("slides.pptx"), "PK"),
        ]);
        let resp = test::call_service(&app, post_form("/api/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "invalid_credential");
        assert_eq!(json["warning"], "Key not valid or API is down.");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_api_oversized_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state_with(AppConfig {
            upload_dir: dir.path().to_path_buf(),
            max_upload_bytes: 16,
            ..AppConfig::default()
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(routes::configure),
        )
        .await;

        let text = words(50);
        let body = multipart(&[
            ("api_key", None, "sk-abcdef"),
            ("file", Some("notes.txt"), text.as_str()),
        ]);
        let resp = test::call_service(&app, post_form("/api/summarize", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "invalid_input");
        assert_eq!(json["warning"], "Uploaded file is larger than 16 bytes");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
