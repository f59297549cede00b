use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use engine::{EmailMessage, EmailSender};
use mailer::{HttpMailer, MailerConfig};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Provider {
    received: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    reject: bool,
}

async fn emails(
    State(provider): State<Provider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    provider.received.lock().unwrap().push((auth, body));
    if provider.reject {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "invalid recipient"})),
        );
    }
    (StatusCode::OK, Json(json!({"id": "em_123"})))
}

async fn spawn_provider(provider: Provider) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/emails", post(emails))
        .with_state(provider);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn mailer(base_url: String) -> HttpMailer {
    HttpMailer::new(MailerConfig {
        base_url,
        api_key: "re_test".to_string(),
        from: "Reimbursements <noreply@uni.example>".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn message() -> EmailMessage {
    EmailMessage {
        to: "alice@uni.example".to_string(),
        subject: "Reimbursement approved".to_string(),
        html: "<p>ok</p>".to_string(),
    }
}

#[tokio::test]
async fn posts_message_with_bearer_key() {
    let provider = Provider::default();
    let base_url = spawn_provider(provider.clone()).await;

    let receipt = mailer(base_url).send(&message()).await.unwrap();
    assert_eq!(receipt.id, "em_123");

    let received = provider.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let (auth, body) = &received[0];
    assert_eq!(auth.as_deref(), Some("Bearer re_test"));
    assert_eq!(body["to"], json!(["alice@uni.example"]));
    assert_eq!(body["subject"], "Reimbursement approved");
    assert_eq!(body["from"], "Reimbursements <noreply@uni.example>");
}

#[tokio::test]
async fn provider_errors_become_email_errors() {
    let provider = Provider {
        reject: true,
        ..Provider::default()
    };
    let base_url = spawn_provider(provider).await;

    let err = mailer(base_url).send(&message()).await.unwrap_err();
    assert!(err.0.contains("invalid recipient"));
    assert!(err.0.contains("422"));
}
