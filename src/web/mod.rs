use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::review::ReviewService;

pub mod handlers;
pub mod types;

#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<ReviewService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/status", get(handlers::status))
        .route("/api/example", get(handlers::example))
        .route("/api/reply", post(handlers::reply))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, ReviewRecord};
    use crate::inference::{testing::ScriptedModel, ConnectError, ModelConnector};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(connector: ModelConnector) -> Router {
        let dataset = Dataset::new(vec![ReviewRecord {
            text: "O feijão estava frio".into(),
            liked: 0,
        }]);
        let reviews = ReviewService::new(Arc::new(connector), Arc::new(dataset));
        router(AppState {
            reviews: Arc::new(reviews),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_reply(review: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/reply")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "review": review }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn reply_endpoint_returns_status_and_text() {
        let model = Arc::new(ScriptedModel::answering(&[
            "2",
            "Olá! Pedimos desculpas pelo feijão frio",
        ]));
        let response = app(ModelConnector::configured(model))
            .oneshot(post_reply("O feijão estava frio"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "sentiment": "Negativo 😕 (2 estrelas)",
                "reply": "Olá! Pedimos desculpas pelo feijão frio."
            })
        );
    }

    #[tokio::test]
    async fn reply_endpoint_reports_unconfigured_api() {
        let response = app(ModelConnector::unconfigured(ConnectError::MissingCredential))
            .oneshot(post_reply("Ótimo"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["sentiment"], "Erro 😞");
    }

    #[tokio::test]
    async fn example_endpoint_samples_dataset() {
        let response = app(ModelConnector::unconfigured(ConnectError::MissingCredential))
            .oneshot(Request::get("/api/example").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "review": "O feijão estava frio" })
        );
    }

    #[tokio::test]
    async fn status_endpoint_exposes_active_model() {
        let model = Arc::new(ScriptedModel::answering(&[]));
        let response = app(ModelConnector::configured(model))
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({ "configured": true, "model": "scripted" })
        );
    }

    #[tokio::test]
    async fn index_shows_setup_notice_when_unconfigured() {
        let response = app(ModelConnector::unconfigured(ConnectError::MissingCredential))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("API não configurada"));
        assert!(html.contains("GOOGLE_API_KEY"));
    }
}
