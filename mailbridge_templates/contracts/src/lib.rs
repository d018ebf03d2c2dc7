use mailbridge_models::{contact::ContactRequest, email_address::EmailAddressWithName};
use serde::Serialize;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TemplateService: Send + Sync + 'static {
    /// Render the given template in the requested format.
    ///
    /// Values substituted into [`TemplateFormat::Html`] templates are always
    /// HTML-escaped, values in [`TemplateFormat::Text`] templates never are.
    fn render<T: Template + 'static>(
        &self,
        template: &T,
        format: TemplateFormat,
    ) -> anyhow::Result<String>;
}

#[cfg(feature = "mock")]
impl MockTemplateService {
    pub fn with_render<T: Template + Send + PartialEq + std::fmt::Debug + 'static>(
        mut self,
        template: T,
        format: TemplateFormat,
        result: String,
    ) -> Self {
        self.expect_render::<T>()
            .once()
            .with(
                mockall::predicate::eq(template),
                mockall::predicate::eq(format),
            )
            .return_once(|_, _| Ok(result));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateFormat {
    Text,
    Html,
}

impl TemplateFormat {
    pub const ALL: [Self; 2] = [Self::Text, Self::Html];

    /// The suffix of the registered template name, which also decides whether
    /// autoescaping is applied.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Html => ".html",
        }
    }
}

pub trait Template: Serialize {
    const NAME: &'static str;
    const TEXT: &'static str;
    const HTML: &'static str;

    fn source(format: TemplateFormat) -> &'static str {
        match format {
            TemplateFormat::Text => Self::TEXT,
            TemplateFormat::Html => Self::HTML,
        }
    }
}

pub const BASE_TEMPLATE: &str = include_str!("../templates/base.html");

macro_rules! templates {
    ($( $ident:ident ( $name:literal ), )* ) => {
        $(
            impl Template for $ident {
                const NAME: &'static str = $name;
                const TEXT: &'static str = include_str!(concat!("../templates/", $name, ".txt"));
                const HTML: &'static str = include_str!(concat!("../templates/", $name, ".html"));
            }
        )*

        /// `(name, text source, html source)` of every template
        pub const TEMPLATES: &[(&str, &str, &str)] = &[
            $( ($ident::NAME, $ident::TEXT, $ident::HTML) ),*
        ];
    };
}

templates! {
    ContactNotificationTemplate("contact_notification"),
}

pub const MESSAGE_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactNotificationTemplate {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
    pub recipient_name: Option<String>,
}

impl ContactNotificationTemplate {
    pub fn new(request: &ContactRequest, recipient: &EmailAddressWithName) -> Self {
        Self {
            fullname: request.fullname.to_string(),
            email: request.email.to_string(),
            phone: request.phone.to_string(),
            company: request.company.to_string(),
            message: request
                .message
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| MESSAGE_PLACEHOLDER.into()),
            recipient_name: recipient.0.name.clone(),
        }
    }
}
