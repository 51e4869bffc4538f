use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use futures_util::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::use_cases::analyze::AnalyzeUseCase;
use crate::domain::chart::ChartOutcome;
use crate::domain::error::AppError;
use crate::domain::stats::SummaryStats;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::BlobStore;

/// Shared per-process state handed to every request handler.
pub struct AppState {
    pub analyze_use_case: AnalyzeUseCase,
    pub charts: Arc<dyn BlobStore>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub summary: SummaryStats,
    pub chart_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Static chart path; empty when no chart was produced for this analysis.
fn chart_url(outcome: &ChartOutcome) -> String {
    match outcome.chart_id() {
        Some(chart_id) => format!("/chart/{}", chart_id),
        None => String::new(),
    }
}

async fn read_upload(payload: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::ParseError(format!("invalid multipart payload: {}", e)))?
    {
        if field.name() != "file" {
            // drain the unwanted field so the stream can advance
            while let Ok(Some(_)) = field.try_next().await {}
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::ParseError(format!("failed to read upload: {}", e)))?
        {
            bytes.extend_from_slice(&chunk);
        }

        return Ok((filename, bytes));
    }

    Err(AppError::ParseError(
        "missing multipart field `file`".to_string(),
    ))
}

#[post("/analyze")]
async fn analyze(data: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let (filename, bytes) = match read_upload(&mut payload).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!(error = %err, "Rejected analyze request");
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: err.to_string(),
            });
        }
    };

    if bytes.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "uploaded file is empty".to_string(),
        });
    }

    info!(filename = %filename, size = bytes.len(), "Analyzing upload");

    match data.analyze_use_case.execute(&filename, &bytes) {
        Ok(report) => HttpResponse::Ok().json(AnalyzeResponse {
            chart_url: chart_url(&report.chart),
            summary: report.summary,
        }),
        Err(AppError::ParseError(msg)) => {
            warn!(filename = %filename, error = %msg, "Upload is not tabular data");
            HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("Failed to read file: {}", msg),
            })
        }
        Err(err) => {
            error!(filename = %filename, error = %err, "Analysis failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: err.to_string(),
            })
        }
    }
}

#[get("/chart/{filename}")]
async fn get_chart(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let filename = path.into_inner();
    if !is_safe_chart_id(&filename) {
        return chart_not_found();
    }

    match data.charts.get(&filename) {
        Ok(bytes) => HttpResponse::Ok().content_type("image/png").body(bytes),
        Err(AppError::NotFound(_)) => chart_not_found(),
        Err(err) => {
            error!(filename = %filename, error = %err, "Chart read failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: err.to_string(),
            })
        }
    }
}

fn chart_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Chart not found".to_string(),
    })
}

/// Chart identifiers are bare file names; anything path-like 404s.
fn is_safe_chart_id(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains('/')
        && !filename.contains('\\')
}

pub fn start_server(state: AppState, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // any origin may call this service

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(analyze)
            .service(get_chart)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ingest::IngestUseCase;
    use crate::infrastructure::chart::HeatmapRenderer;
    use crate::infrastructure::storage::MemoryBlobStore;
    use actix_web::{http::StatusCode, test};

    const BOUNDARY: &str = "test-boundary-7f93a2";

    fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn content_type() -> (&'static str, String) {
        (
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
    }

    struct TestContext {
        uploads: Arc<MemoryBlobStore>,
        charts: Arc<MemoryBlobStore>,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                uploads: Arc::new(MemoryBlobStore::new()),
                charts: Arc::new(MemoryBlobStore::new()),
            }
        }

        fn state(&self) -> AppState {
            AppState {
                analyze_use_case: AnalyzeUseCase::new(
                    IngestUseCase::new(self.uploads.clone()),
                    self.charts.clone(),
                    HeatmapRenderer::default(),
                ),
                charts: self.charts.clone(),
            }
        }
    }

    macro_rules! test_app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ctx.state()))
                    .service(analyze)
                    .service(get_chart),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_analyze_returns_summary() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(content_type())
            .set_payload(multipart_body("people.csv", b"name,age\nAlice,30\nBob,25\n"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["summary"]["age"]["count"], 2);
        assert_eq!(body["summary"]["age"]["mean"], 27.5);
        assert_eq!(body["summary"]["name"]["unique"], 2);
        assert!(body["chart_url"].is_string());
    }

    #[actix_web::test]
    async fn test_analyze_stores_upload_under_original_name() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let csv = b"a\n1\n";
        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(content_type())
            .set_payload(multipart_body("mine.csv", csv))
            .to_request();
        test::call_service(&app, req).await;

        assert_eq!(ctx.uploads.get("mine.csv").unwrap(), csv.to_vec());
    }

    #[actix_web::test]
    async fn test_analyze_rejects_binary_garbage() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(content_type())
            .set_payload(multipart_body("junk.csv", &[0u8, 255, 1, 2, 0, 7]))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert!(ctx.charts.keys().is_empty());
    }

    #[actix_web::test]
    async fn test_analyze_without_file_field_is_rejected() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(content_type())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_zero_numeric_columns_still_succeeds() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(content_type())
            .set_payload(multipart_body("words.csv", b"name,city\nAlice,NYC\nBob,LA\n"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["chart_url"], "");
        assert_eq!(body["summary"]["city"]["count"], 2);
        assert!(ctx.charts.keys().is_empty());
    }

    #[actix_web::test]
    async fn test_second_upload_same_name_wins() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        for (idx, csv) in [&b"v\n1\n2\n"[..], &b"v\n10\n20\n"[..]].into_iter().enumerate() {
            let req = test::TestRequest::post()
                .uri("/analyze")
                .insert_header(content_type())
                .set_payload(multipart_body("data.csv", csv))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            if idx == 1 {
                let body: serde_json::Value = test::read_body_json(resp).await;
                assert_eq!(body["summary"]["v"]["mean"], 15.0);
            }
        }

        assert_eq!(ctx.uploads.get("data.csv").unwrap(), b"v\n10\n20\n".to_vec());
    }

    #[actix_web::test]
    async fn test_chart_roundtrip_is_byte_identical() {
        let ctx = TestContext::new();
        let png = b"\x89PNG\r\n\x1a\nfake-image-payload".to_vec();
        ctx.charts.put("abc123.png", &png).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/chart/abc123.png").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap().to_str().unwrap(),
            "image/png"
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.to_vec(), png);
    }

    #[actix_web::test]
    async fn test_unknown_chart_is_404() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/chart/missing.png").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Chart not found");
    }

    #[actix_web::test]
    async fn test_path_like_chart_id_is_404() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/chart/..").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
