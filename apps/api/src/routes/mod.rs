pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::career::extract::MAX_PDF_BYTES;
use crate::career::handlers as career;
use crate::export::handlers as export;
use crate::payments::{handlers as payments, webhook};
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // IntaSend callbacks
        .route("/", get(webhook::handle_webhook_health))
        .route("/intasend/webhook", post(webhook::handle_intasend_webhook))
        // Users
        .route("/api/v1/login", post(users::handle_login))
        .route(
            "/api/v1/users/:user_id/unlock",
            get(users::handle_unlock_status),
        )
        // Career generation
        .route("/api/v1/jobs/analyze", post(career::handle_analyze_job))
        .route(
            "/api/v1/resumes/extract",
            post(career::handle_extract_resume).layer(DefaultBodyLimit::max(MAX_PDF_BYTES)),
        )
        .route("/api/v1/generate", post(career::handle_generate))
        .route("/api/v1/career-pack", post(career::handle_career_pack))
        .route("/api/v1/linkedin", post(career::handle_linkedin))
        .route("/api/v1/interview", post(career::handle_interview))
        .route(
            "/api/v1/users/:user_id/outputs",
            get(career::handle_get_outputs),
        )
        .route(
            "/api/v1/users/:user_id/outputs/:document/download",
            get(export::handle_download),
        )
        // Payments
        .route("/api/v1/payments/stk-push", post(payments::handle_stk_push))
        .route(
            "/api/v1/payments/:reference/status",
            get(payments::handle_payment_status),
        )
        // Admin
        .route("/api/v1/admin/users", get(admin::handle_find_users))
        .route(
            "/api/v1/admin/users/:user_id/mark-paid",
            post(admin::handle_mark_paid),
        )
        .route(
            "/api/v1/admin/users/:user_id/outputs",
            get(admin::handle_user_outputs),
        )
        .route("/api/v1/admin/payments", get(admin::handle_list_payments))
        .route("/api/v1/admin/llm/models", get(admin::handle_llm_models))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::admin::ADMIN_PASSWORD_HEADER;
    use crate::llm_client::LlmProvider;
    use crate::payments::intasend::{PaymentGateway, ProviderState};
    use crate::payments::webhook::{sign, SIGNATURE_HEADER};
    use crate::test_support::{test_state, StubGateway, StubLlm};

    const WEBHOOK_SECRET: &str = "ISSecretKey_test_123";
    const ADMIN_PASSWORD: &str = "letmein";

    fn career_llm() -> Arc<dyn LlmProvider> {
        Arc::new(StubLlm::routed(&[
            (
                "Analyze the following job description",
                r#"{"job_title": "Data Analyst", "company": "Safaricom PLC", "keywords": ["SQL", "Power BI"]}"#,
            ),
            (
                "Rewrite the candidate's resume",
                "# Jane Wanjiku\n\n## Experience\n- Built Power BI dashboards for 47 counties",
            ),
            (
                "Write a tailored cover letter",
                "Dear Hiring Manager,\n\nI am applying for the Data Analyst role.",
            ),
            (
                "Write a follow-up email strategy",
                r#"{"emails": [{"subject": "Application follow-up", "body": "Dear Hiring Team", "send_after": "3 days"}]}"#,
            ),
        ]))
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn admin(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(ADMIN_PASSWORD_HEADER, ADMIN_PASSWORD)
            .body(Body::empty())
            .unwrap()
    }

    fn webhook(body: &Value, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/intasend/webhook")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = send(
            app,
            post_json(
                "/api/v1/login",
                json!({"phone": "0722 123 456", "email": "Jane@Example.com"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = json_body(response).await;
        assert_eq!(user["phone"], "254722123456");
        assert_eq!(user["email"], "jane@example.com");
        user["user_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = build_router(test_state(None, None).await);

        let body = json_body(send(&app, get("/health")).await).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "career-api");

        let body = json_body(send(&app, get("/")).await).await;
        assert_eq!(body, json!({"status": "ok", "service": "intasend-webhook"}));
    }

    #[tokio::test]
    async fn test_login_is_stable_and_requires_both_fields() {
        let app = build_router(test_state(None, None).await);
        let first = login(&app).await;
        let second = login(&app).await;
        assert_eq!(first, second);

        let response = send(
            &app,
            post_json("/api/v1/login", json!({"phone": "0722123456", "email": " "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Enter BOTH phone and email.");
    }

    #[tokio::test]
    async fn test_generation_without_api_key_is_unavailable() {
        let app = build_router(test_state(None, None).await);
        let response = send(
            &app,
            post_json("/api/v1/jobs/analyze", json!({"job_description": "Data analyst"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_generate_saves_outputs_and_gates_downloads() {
        let app = build_router(test_state(Some(career_llm()), None).await);
        let user_id = login(&app).await;

        let analysis = json_body(
            send(
                &app,
                post_json(
                    "/api/v1/jobs/analyze",
                    json!({"job_description": "Data Analyst at Safaricom. SQL, Power BI."}),
                ),
            )
            .await,
        )
        .await;
        assert_eq!(analysis["job_analysis"]["job_title"], "Data Analyst");

        let response = send(
            &app,
            post_json(
                "/api/v1/generate",
                json!({
                    "user_id": user_id,
                    "resume_text": "Jane Wanjiku. Analyst at KCB, 3 years.",
                    "job_analysis": analysis["job_analysis"],
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let generated = json_body(response).await;
        assert_eq!(generated["saved"], true);
        assert!(generated["resume_markdown"]
            .as_str()
            .unwrap()
            .starts_with("# Jane Wanjiku"));
        assert_eq!(generated["emails"][0]["subject"], "Application follow-up");

        let outputs = json_body(send(&app, get(&format!("/api/v1/users/{user_id}/outputs"))).await).await;
        assert_eq!(outputs["paid"], false);
        assert!(outputs["outputs"]["cover_letter"]
            .as_str()
            .unwrap()
            .starts_with("Dear Hiring Manager"));

        let download = format!("/api/v1/users/{user_id}/outputs/resume/download?format=pdf");
        let response = send(&app, get(&download)).await;
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = json_body(response).await;
        assert!(body["error"]["payment_link"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/254722285538?text="));

        let response = send(
            &app,
            admin("POST", &format!("/api/v1/admin/users/{user_id}/mark-paid")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get(&download)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ats_resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let response = send(
            &app,
            get(&format!("/api/v1/users/{user_id}/outputs/cover-letter/download?format=rtf")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_requires_job_analysis() {
        let app = build_router(test_state(Some(career_llm()), None).await);
        let user_id = login(&app).await;

        let response = send(
            &app,
            post_json(
                "/api/v1/generate",
                json!({"user_id": user_id, "resume_text": "Jane Wanjiku"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Analyse the job first.");

        let response = send(
            &app,
            get(&format!("/api/v1/users/{user_id}/outputs")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stk_push_then_webhook_unlocks_user() {
        let gateway = Arc::new(StubGateway::default());
        let app = build_router(
            test_state(None, Some(gateway.clone() as Arc<dyn PaymentGateway>)).await,
        );
        let user_id = login(&app).await;

        let response = send(
            &app,
            post_json("/api/v1/payments/stk-push", json!({"user_id": user_id})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let push = json_body(response).await;
        assert_eq!(push["transaction_reference"], "INV-1");
        assert_eq!(push["amount"], 1000);
        assert_eq!(push["status"], "pending");
        assert_eq!(gateway.pushes()[0].0, "254722123456");

        let payload = json!({"invoice_id": "INV-1", "state": "COMPLETE"});
        let response = send(&app, webhook(&payload, None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let signature = sign(WEBHOOK_SECRET, payload.to_string().as_bytes());
        let body = json_body(send(&app, webhook(&payload, Some(signature.clone()))).await).await;
        assert_eq!(
            body,
            json!({"ok": true, "updated": true, "action": "payment_marked_paid"})
        );

        // Provider retries are harmless.
        let body = json_body(send(&app, webhook(&payload, Some(signature))).await).await;
        assert_eq!(
            body,
            json!({"ok": true, "updated": false, "action": "already_completed"})
        );

        let unlock = json_body(send(&app, get(&format!("/api/v1/users/{user_id}/unlock"))).await).await;
        assert_eq!(unlock["paid"], true);
        assert_eq!(unlock["amount_kes"], 1000);
    }

    #[tokio::test]
    async fn test_webhook_edge_cases() {
        let app = build_router(test_state(None, None).await);

        let pending = json!({"invoice_id": "INV-9", "state": "PROCESSING"});
        let signature = sign(WEBHOOK_SECRET, pending.to_string().as_bytes());
        let body = json_body(send(&app, webhook(&pending, Some(signature))).await).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["ignored"], true);

        let unknown = json!({"invoice_id": "INV-404", "state": "COMPLETE"});
        let signature = sign(WEBHOOK_SECRET, unknown.to_string().as_bytes());
        let response = send(&app, webhook(&unknown, Some(signature))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let missing = json!({"state": "COMPLETE"});
        let signature = sign(WEBHOOK_SECRET, missing.to_string().as_bytes());
        let response = send(&app, webhook(&missing, Some(signature))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_with_null_state_and_invoice_id_completes_payment() {
        let gateway = Arc::new(StubGateway::default());
        let app = build_router(
            test_state(None, Some(gateway as Arc<dyn PaymentGateway>)).await,
        );
        let user_id = login(&app).await;
        send(
            &app,
            post_json("/api/v1/payments/stk-push", json!({"user_id": user_id})),
        )
        .await;

        let payload = json!({
            "invoice_id": null,
            "invoice": "INV-1",
            "state": null,
            "status": "COMPLETE"
        });
        let signature = sign(WEBHOOK_SECRET, payload.to_string().as_bytes());
        let body = json_body(send(&app, webhook(&payload, Some(signature))).await).await;
        assert_eq!(
            body,
            json!({"ok": true, "updated": true, "action": "payment_marked_paid"})
        );

        let unlock = json_body(send(&app, get(&format!("/api/v1/users/{user_id}/unlock"))).await).await;
        assert_eq!(unlock["paid"], true);
    }

    #[tokio::test]
    async fn test_webhook_with_blank_state_uses_status() {
        let gateway = Arc::new(StubGateway::default());
        let app = build_router(
            test_state(None, Some(gateway as Arc<dyn PaymentGateway>)).await,
        );
        let user_id = login(&app).await;
        send(
            &app,
            post_json("/api/v1/payments/stk-push", json!({"user_id": user_id})),
        )
        .await;

        let payload = json!({"invoice_id": "INV-1", "state": "", "status": "FAILED"});
        let signature = sign(WEBHOOK_SECRET, payload.to_string().as_bytes());
        let body = json_body(send(&app, webhook(&payload, Some(signature))).await).await;
        assert_eq!(
            body,
            json!({"ok": true, "updated": true, "action": "payment_marked_failed"})
        );
    }

    #[tokio::test]
    async fn test_status_poll_applies_provider_state() {
        let gateway = Arc::new(StubGateway::default());
        let app = build_router(
            test_state(None, Some(gateway.clone() as Arc<dyn PaymentGateway>)).await,
        );
        let user_id = login(&app).await;
        send(
            &app,
            post_json("/api/v1/payments/stk-push", json!({"user_id": user_id})),
        )
        .await;

        let body = json_body(send(&app, get("/api/v1/payments/INV-1/status")).await).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["provider_state"], "pending");

        gateway.set_state("INV-1", ProviderState::Failed);
        let body = json_body(send(&app, get("/api/v1/payments/INV-1/status")).await).await;
        assert_eq!(body["status"], "failed");

        // Final records are not polled again.
        gateway.set_state("INV-1", ProviderState::Paid);
        let body = json_body(send(&app, get("/api/v1/payments/INV-1/status")).await).await;
        assert_eq!(body["status"], "failed");
        assert!(body["provider_state"].is_null());
    }

    #[tokio::test]
    async fn test_admin_routes_require_password() {
        let app = build_router(test_state(Some(career_llm()), None).await);
        let user_id = login(&app).await;

        let response = send(&app, get("/api/v1/admin/payments")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(send(&app, admin("GET", "/api/v1/admin/users?phone=0722123456")).await).await;
        assert_eq!(body["users"][0]["user_id"], user_id.as_str());
        assert_eq!(body["users"][0]["paid"], false);

        let response = send(&app, admin("GET", "/api/v1/admin/users")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        send(
            &app,
            admin("POST", &format!("/api/v1/admin/users/{user_id}/mark-paid")),
        )
        .await;
        let body = json_body(send(&app, admin("GET", "/api/v1/admin/payments")).await).await;
        assert_eq!(body["payments"][0]["phone_number"], "WHATSAPP");
        assert_eq!(body["payments"][0]["status"], "completed");

        let body = json_body(
            send(&app, admin("GET", &format!("/api/v1/admin/users/{user_id}/outputs"))).await,
        )
        .await;
        assert_eq!(body["paid"], true);
        assert!(body["outputs"].is_null());
        assert!(body["unlock_message"]
            .as_str()
            .unwrap()
            .contains(&user_id));

        let body = json_body(send(&app, admin("GET", "/api/v1/admin/llm/models")).await).await;
        assert_eq!(body["configured_model"], "gemini-2.0-flash");
        assert_eq!(body["models"], json!(["models/stub-1"]));
    }
}
