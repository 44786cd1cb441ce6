// src/web/mod.rs

pub mod pages;
pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

use crate::environment::AppConfig;
use crate::form::InteractionPatterns;
use crate::inspect::{FormInspector, FormPlan};
use crate::service::ApplicationService;
use crate::types::response::{ApplyRequest, ApplyResponse};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: "worker",
    })
}

#[post("/apply", data = "<request>")]
pub async fn apply(
    request: Json<ApplyRequest>,
    service: &State<ApplicationService>,
) -> (Status, Json<ApplyResponse>) {
    let response = service.apply(&request).await;
    let status = if response.ok || response.error_code.is_none() {
        Status::Ok
    } else {
        Status::InternalServerError
    };
    (status, Json(response))
}

#[post("/inspect", data = "<request>")]
pub async fn inspect(
    request: Json<InspectRequest>,
    inspector: &State<FormInspector>,
) -> Result<Json<FormPlan>, (Status, Json<ErrorResponse>)> {
    inspector.inspect(&request.url).await.map(Json).map_err(|e| {
        (
            Status::BadGateway,
            Json(ErrorResponse::new(format!("{:#}", e), "INSPECT_FAILED")),
        )
    })
}

#[get("/demo-form")]
pub fn demo_form() -> RawHtml<&'static str> {
    RawHtml(pages::DEMO_FORM)
}

#[get("/public/ok.html")]
pub fn submitted() -> RawHtml<&'static str> {
    RawHtml(pages::SUBMITTED)
}

#[post("/public/ok.html")]
pub fn submitted_post() -> RawHtml<&'static str> {
    RawHtml(pages::SUBMITTED)
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Invalid request format", "BAD_REQUEST"))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Not found", "NOT_FOUND"))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Request body is missing required fields",
        "INVALID_REQUEST",
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR"))
}

pub fn build_rocket(service: ApplicationService, inspector: FormInspector) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(service)
        .manage(inspector)
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/",
            routes![
                health,
                apply,
                inspect,
                demo_form,
                submitted,
                submitted_post,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let service = ApplicationService::chrome(&config)?;
    let inspector = FormInspector::new(InteractionPatterns::from_config(&config.engine)?)?;

    info!("Starting application worker on port {}", config.server.port);
    info!("Data directory: {}", config.storage.data_dir.display());
    info!(
        "Templates: {:?}",
        service.generator().templates().list_templates()
    );

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", "0.0.0.0"));

    build_rocket(service, inspector)
        .configure(figment)
        .launch()
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TemplateEngine;
    use crate::environment::{EngineConfig, MissingProfile};
    use crate::form::testing::{FakeBehaviour, FakeLauncher, StubRenderer};
    use crate::form::FormEngine;
    use crate::generator::DocumentGenerator;
    use crate::profile_store::ProfileStore;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn client(dir: &TempDir, launcher: FakeLauncher) -> Client {
        let modern = dir.path().join("templates").join("modern");
        std::fs::create_dir_all(&modern).unwrap();
        std::fs::write(modern.join("cv.html"), "<h1>{{resume.fullName}}</h1>").unwrap();

        let engine_config = EngineConfig {
            navigation_timeout_secs: 1,
            file_chooser_wait_ms: 20,
            settle_ms: 5,
            ..EngineConfig::default()
        };
        let service = ApplicationService::new(
            ProfileStore::new(dir.path().join("profile"), MissingProfile::Default),
            DocumentGenerator::new(
                TemplateEngine::new(dir.path().join("templates")).unwrap(),
                "modern",
                Arc::new(StubRenderer::default()),
                dir.path().join("cv"),
            ),
            FormEngine::new(
                Arc::new(launcher),
                InteractionPatterns::standard(),
                engine_config,
                dir.path().join("proofs"),
            ),
            dir.path().join("logs").join("error.log"),
            Duration::from_secs(10),
        );
        let inspector = FormInspector::new(InteractionPatterns::standard()).unwrap();

        Client::tracked(build_rocket(service, inspector)).await.unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir, FakeLauncher::serving(pages::DEMO_FORM)).await;

        let response = client.get("/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body, serde_json::json!({"ok": true, "service": "worker"}));
    }

    #[tokio::test]
    async fn test_apply_against_demo_form() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(FakeBehaviour {
            html: pages::DEMO_FORM.to_string(),
            html_after_click: Some(pages::SUBMITTED.to_string()),
            ..FakeBehaviour::default()
        });
        let client = client(&dir, launcher.clone()).await;

        let response = client
            .post("/apply")
            .header(ContentType::JSON)
            .body(r#"{"url": "http://localhost:3000/demo-form"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["ok"], true);
        assert!(body["pdfPath"].as_str().unwrap().contains("Alex_Applicant_General_Role_"));
        assert!(body["proof"].as_str().unwrap().ends_with(".png"));
        assert!(body["htmlSnippet"].as_str().unwrap().contains("Submitted"));
        assert_eq!(body["steps"].as_array().unwrap().len(), 7);

        let recorded = launcher.recorded();
        assert_eq!(recorded.fills.len(), 3);
        assert_eq!(recorded.attachments.len(), 1);
        assert_eq!(recorded.clicks, vec!["Submit".to_string()]);
    }

    #[tokio::test]
    async fn test_apply_fatal_error_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(FakeBehaviour {
            fail_launch: true,
            ..FakeBehaviour::default()
        });
        let client = client(&dir, launcher).await;

        let response = client
            .post("/apply")
            .header(ContentType::JSON)
            .body(r#"{"url": "https://jobs.example.com", "profile_id": "jane", "target_role": "CTO"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::InternalServerError);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["errorCode"], "SESSION_ERROR");
        assert!(body.get("pdfPath").is_none());
    }

    #[tokio::test]
    async fn test_apply_without_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir, FakeLauncher::serving(pages::DEMO_FORM)).await;

        let response = client
            .post("/apply")
            .header(ContentType::JSON)
            .body(r#"{"profile_id": "jane"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["errorCode"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_demo_pages_and_cors() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir, FakeLauncher::serving(pages::DEMO_FORM)).await;

        let response = client.get("/demo-form").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
        assert!(response
            .into_string()
            .await
            .unwrap()
            .contains("Demo Application Form"));

        let response = client.post("/public/ok.html").dispatch().await;
        assert!(response.into_string().await.unwrap().contains("Submitted"));
    }

    #[test]
    fn test_demo_form_is_fully_recognized() {
        let inspector = FormInspector::new(InteractionPatterns::standard()).unwrap();
        let plan = inspector.plan_for(pages::DEMO_FORM);

        assert!(plan.fields.iter().all(|f| f.control.is_some()));
        assert!(matches!(plan.upload, crate::inspect::UploadPlan::FileInput { .. }));
        assert_eq!(plan.submit.as_deref(), Some("<button> \"Submit\""));
    }
}
