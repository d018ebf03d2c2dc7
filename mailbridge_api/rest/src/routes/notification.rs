use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing, Json, Router,
};
use mailbridge_core_notification_contracts::{NotificationFeatureService, NotificationSendError};

use super::{error, internal_server_error, success, validate};
use crate::models::ApiContactRequest;

pub fn router(service: Arc<impl NotificationFeatureService>) -> Router<()> {
    Router::new()
        .route("/send-email", routing::post(send_email))
        .with_state(service)
}

async fn send_email(
    service: State<Arc<impl NotificationFeatureService>>,
    payload: Result<Json<ApiContactRequest>, JsonRejection>,
) -> Response {
    let request = match validate(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match service.send_notification(request).await {
        Ok(()) => success(StatusCode::OK, "Email sent successfully"),
        Err(NotificationSendError::Delivery(err)) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to send email: {err:#}"),
        ),
        Err(NotificationSendError::Other(err)) => internal_server_error(err),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use mailbridge_core_notification_contracts::MockNotificationFeatureService;
    use mailbridge_demo::JANE;
    use mailbridge_models::contact::{ContactMessage, ContactRequest};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::tests::{into_json, post_json};

    const JANE_JSON: &str = r#"{"fullname":"Jane Doe","email":"jane@example.com","phone":"555-1234","company":"Acme","message":"Interested in pricing"}"#;

    #[tokio::test]
    async fn ok() {
        // Arrange
        let service = MockNotificationFeatureService::new()
            .with_send_notification(JANE.clone(), Ok(()));
        let sut = router(Arc::new(service));

        // Act
        let response = sut.oneshot(post_json("/send-email", JANE_JSON)).await.unwrap();

        // Assert
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::OK,
                json!({"success": true, "message": "Email sent successfully"})
            )
        );
    }

    #[tokio::test]
    async fn header_injection_is_sanitized() {
        // Arrange
        let expected = ContactRequest {
            message: Some(ContactMessage::try_new("Hi Bcc: victim@example.com").unwrap()),
            ..JANE.clone()
        };
        let service =
            MockNotificationFeatureService::new().with_send_notification(expected, Ok(()));
        let sut = router(Arc::new(service));

        let body = json!({
            "fullname": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-1234",
            "company": "Acme",
            "message": "Hi\r\nBcc: victim@example.com",
        });

        // Act
        let response = sut
            .oneshot(post_json("/send-email", body.to_string()))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_email() {
        // Arrange
        let sut = router(Arc::new(MockNotificationFeatureService::new()));
        let body = JANE_JSON.replace("jane@example.com", "not-an-email");

        // Act
        let response = sut.oneshot(post_json("/send-email", body)).await.unwrap();

        // Assert
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "message": "email: invalid email format"})
            )
        );
    }

    #[tokio::test]
    async fn email_with_line_break() {
        // Arrange
        let sut = router(Arc::new(MockNotificationFeatureService::new()));
        let body = json!({
            "fullname": "Jane Doe",
            "email": "jane@example.com\r\nBcc: victim@example.com",
            "phone": "555-1234",
            "company": "Acme",
        });

        // Act
        let response = sut
            .oneshot(post_json("/send-email", body.to_string()))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_fields() {
        // Arrange
        let sut = router(Arc::new(MockNotificationFeatureService::new()));

        // Act
        let response = sut.oneshot(post_json("/send-email", "{}")).await.unwrap();

        // Assert
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "fullname: field required; email: field required; \
                                phone: field required; company: field required",
                })
            )
        );
    }

    #[tokio::test]
    async fn malformed_json() {
        // Arrange
        let sut = router(Arc::new(MockNotificationFeatureService::new()));

        // Act
        let response = sut
            .oneshot(post_json("/send-email", r#"{"fullname": 42"#))
            .await
            .unwrap();

        // Assert
        let (status, body) = into_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|x| !x.is_empty()));
    }

    #[tokio::test]
    async fn delivery_error() {
        // Arrange
        let service = MockNotificationFeatureService::new().with_send_notification(
            JANE.clone(),
            Err(NotificationSendError::Delivery(anyhow!("Connection refused"))),
        );
        let sut = router(Arc::new(service));

        // Act
        let response = sut.oneshot(post_json("/send-email", JANE_JSON)).await.unwrap();

        // Assert
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "message": "Failed to send email: Connection refused"})
            )
        );
    }

    #[tokio::test]
    async fn other_error() {
        // Arrange
        let service = MockNotificationFeatureService::new().with_send_notification(
            JANE.clone(),
            Err(NotificationSendError::Other(anyhow!("template missing"))),
        );
        let sut = router(Arc::new(service));

        // Act
        let response = sut.oneshot(post_json("/send-email", JANE_JSON)).await.unwrap();

        // Assert
        assert_eq!(
            into_json(response).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "message": "Internal server error"})
            )
        );
    }
}
