use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use mailbridge_core_notification_contracts::NotificationFeatureService;
use mailbridge_core_submission_contracts::SubmissionFeatureService;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info};

mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub address: SocketAddr,
    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    pub info: ApiInfo,
}

/// Reported by `GET /`.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
}

/// Configuration flags reported by `GET /health`.
///
/// These only tell whether the required settings are present, they say
/// nothing about whether the smtp server or the database are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HealthFlags {
    Notifier {
        smtp_configured: bool,
        recipient_configured: bool,
    },
    Store {
        database_configured: bool,
    },
}

/// Serves `POST /send-email`, which forwards contact requests by email.
#[derive(Debug, Clone)]
pub struct NotifierRestServer<Notification> {
    notification: Notification,
    config: RestServerConfig,
    smtp_configured: bool,
    recipient_configured: bool,
}

impl<Notification> NotifierRestServer<Notification>
where
    Notification: NotificationFeatureService,
{
    pub fn new(
        notification: Notification,
        config: RestServerConfig,
        smtp_configured: bool,
        recipient_configured: bool,
    ) -> Self {
        Self {
            notification,
            config,
            smtp_configured,
            recipient_configured,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let address = self.config.address;
        serve(self.router()?, address).await
    }

    fn router(self) -> anyhow::Result<Router<()>> {
        let health = HealthFlags::Notifier {
            smtp_configured: self.smtp_configured,
            recipient_configured: self.recipient_configured,
        };

        let router = Router::new()
            .merge(routes::meta::router(self.config.info, health))
            .merge(routes::notification::router(Arc::new(self.notification)));

        add_middlewares(router, &self.config.cors_origins)
    }
}

/// Serves `POST /submit-request`, which stores contact requests in the
/// database.
#[derive(Debug, Clone)]
pub struct StoreRestServer<Submission> {
    submission: Submission,
    config: RestServerConfig,
    database_configured: bool,
}

impl<Submission> StoreRestServer<Submission>
where
    Submission: SubmissionFeatureService,
{
    pub fn new(submission: Submission, config: RestServerConfig, database_configured: bool) -> Self {
        Self {
            submission,
            config,
            database_configured,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let address = self.config.address;
        serve(self.router()?, address).await
    }

    fn router(self) -> anyhow::Result<Router<()>> {
        let health = HealthFlags::Store {
            database_configured: self.database_configured,
        };

        let router = Router::new()
            .merge(routes::meta::router(self.config.info, health))
            .merge(routes::submission::router(Arc::new(self.submission)));

        add_middlewares(router, &self.config.cors_origins)
    }
}

fn add_middlewares(router: Router<()>, cors_origins: &[String]) -> anyhow::Result<Router<()>> {
    let cors = middlewares::cors::layer(cors_origins)?;

    let router = middlewares::panic_handler::add(router);
    let router = middlewares::trace::add(router);
    let router = middlewares::request_id::add(router);

    Ok(router.layer(cors))
}

async fn serve(router: Router<()>, address: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve http requests")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return std::future::pending().await;
    }
    info!("shutting down");
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use mailbridge_core_notification_contracts::MockNotificationFeatureService;
    use mailbridge_core_submission_contracts::MockSubmissionFeatureService;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    pub fn config() -> RestServerConfig {
        RestServerConfig {
            address: "127.0.0.1:0".parse().unwrap(),
            cors_origins: vec!["*".into()],
            info: ApiInfo {
                title: "Mailbridge".into(),
                version: "1.0.0".into(),
            },
        }
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .unwrap()
    }

    pub async fn into_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn notifier_router() {
        // Arrange
        let sut = NotifierRestServer::new(MockNotificationFeatureService::new(), config(), true, false)
            .router()
            .unwrap();

        // Act
        let response = sut.oneshot(get("/health")).await.unwrap();

        // Assert
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::OK,
                json!({"status": "healthy", "smtp_configured": true, "recipient_configured": false})
            )
        );
    }

    #[tokio::test]
    async fn store_router_has_no_send_email() {
        // Arrange
        let sut = StoreRestServer::new(MockSubmissionFeatureService::new(), config(), true)
            .router()
            .unwrap();

        // Act
        let response = sut
            .oneshot(post_json("/send-email", "{}"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_cors_origin() {
        // Arrange
        let config = RestServerConfig {
            cors_origins: vec!["bad\u{7f}origin".into()],
            ..config()
        };

        // Act
        let result = StoreRestServer::new(MockSubmissionFeatureService::new(), config, true).router();

        // Assert
        result.unwrap_err();
    }
}
