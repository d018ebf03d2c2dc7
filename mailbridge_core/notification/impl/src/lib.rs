use std::sync::Arc;

use anyhow::anyhow;
use mailbridge_core_notification_contracts::{NotificationFeatureService, NotificationSendError};
use mailbridge_email_contracts::{Email, EmailBody, EmailService};
use mailbridge_models::{contact::ContactRequest, email_address::EmailAddressWithName};
use mailbridge_templates_contracts::{
    ContactNotificationTemplate, TemplateFormat, TemplateService,
};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct NotificationFeatureServiceImpl<EmailS, TemplateS> {
    email: EmailS,
    template: TemplateS,
    config: NotificationFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct NotificationFeatureConfig {
    pub recipient: Arc<EmailAddressWithName>,
}

impl<EmailS, TemplateS> NotificationFeatureServiceImpl<EmailS, TemplateS> {
    pub fn new(email: EmailS, template: TemplateS, config: NotificationFeatureConfig) -> Self {
        Self {
            email,
            template,
            config,
        }
    }
}

impl<EmailS, TemplateS> NotificationFeatureService for NotificationFeatureServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn send_notification(&self, request: ContactRequest) -> Result<(), NotificationSendError> {
        let template = ContactNotificationTemplate::new(&request, &self.config.recipient);
        let text = self.template.render(&template, TemplateFormat::Text)?;
        let html = self.template.render(&template, TemplateFormat::Html)?;

        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("New Contact: {}", *request.fullname),
            body: EmailBody::Alternative { text, html },
            reply_to: Some(request.email.clone().into()),
        };

        let err = match self.email.send(email).await {
            Ok(true) => {
                info!(
                    sender = %request.email,
                    recipient = %self.config.recipient,
                    "contact notification sent"
                );
                return Ok(());
            }
            Ok(false) => anyhow!("The smtp server rejected the message"),
            Err(err) => err,
        };

        error!(
            sender = %request.email,
            recipient = %self.config.recipient,
            "Failed to send contact notification: {err:#}"
        );
        Err(NotificationSendError::Delivery(err))
    }
}

#[cfg(test)]
mod tests {
    use mailbridge_demo::{recipient, JANE};
    use mailbridge_email_contracts::MockEmailService;
    use mailbridge_templates_contracts::MockTemplateService;
    use mailbridge_utils::assert_matches;

    use super::*;

    fn make_template_service() -> MockTemplateService {
        let template = ContactNotificationTemplate::new(&JANE, &recipient());
        MockTemplateService::new()
            .with_render(template.clone(), TemplateFormat::Text, "text".into())
            .with_render(template, TemplateFormat::Html, "<p>html</p>".into())
    }

    fn expected_email() -> Email {
        Email {
            recipient: recipient(),
            subject: "New Contact: Jane Doe".into(),
            body: EmailBody::Alternative {
                text: "text".into(),
                html: "<p>html</p>".into(),
            },
            reply_to: Some("jane@example.com".parse().unwrap()),
        }
    }

    fn make_sut(
        email: MockEmailService,
        template: MockTemplateService,
    ) -> NotificationFeatureServiceImpl<MockEmailService, MockTemplateService> {
        NotificationFeatureServiceImpl::new(
            email,
            template,
            NotificationFeatureConfig {
                recipient: Arc::new(recipient()),
            },
        )
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let email = MockEmailService::new().with_send(expected_email(), true);
        let sut = make_sut(email, make_template_service());

        // Act
        let result = sut.send_notification(JANE.clone()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn rejected() {
        // Arrange
        let email = MockEmailService::new().with_send(expected_email(), false);
        let sut = make_sut(email, make_template_service());

        // Act
        let result = sut.send_notification(JANE.clone()).await;

        // Assert
        assert_matches!(result, Err(NotificationSendError::Delivery(_)));
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let email =
            MockEmailService::new().with_send_error(expected_email(), "Connection refused");
        let sut = make_sut(email, make_template_service());

        // Act
        let result = sut.send_notification(JANE.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(NotificationSendError::Delivery(err)) if err.to_string() == "Connection refused"
        );
    }

    #[tokio::test]
    async fn template_error() {
        // Arrange
        let mut template = MockTemplateService::new();
        template
            .expect_render::<ContactNotificationTemplate>()
            .once()
            .return_once(|_, _| Err(anyhow!("Failed to render template")));
        let sut = make_sut(MockEmailService::new(), template);

        // Act
        let result = sut.send_notification(JANE.clone()).await;

        // Assert
        assert_matches!(result, Err(NotificationSendError::Other(_)));
    }
}
