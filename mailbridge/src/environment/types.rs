use mailbridge_api_rest::{NotifierRestServer, StoreRestServer};
use mailbridge_core_notification_impl::NotificationFeatureServiceImpl;
use mailbridge_core_submission_impl::SubmissionFeatureServiceImpl;
use mailbridge_email_impl::EmailServiceImpl;
use mailbridge_persistence_postgres::{
    contact::PostgresContactRequestRepository, PostgresDatabase,
};
use mailbridge_templates_impl::TemplateServiceImpl;

// Leaf services
pub type Database = PostgresDatabase;
pub type Email = EmailServiceImpl;
pub type Template = TemplateServiceImpl;
pub type ContactRequestRepo = PostgresContactRequestRepository;

// Core
pub type Notification = NotificationFeatureServiceImpl<Email, Template>;
pub type Submission = SubmissionFeatureServiceImpl<Database, ContactRequestRepo>;

// API
pub type NotifierServer = NotifierRestServer<Notification>;
pub type StoreServer = StoreRestServer<Submission>;
