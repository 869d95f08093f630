//! REST clients for the external collaborators.
//!
//! Each collaborator sits behind a trait so stages can be exercised against
//! fakes; the concrete clients are thin `reqwest` wrappers.

pub mod godaddy;
pub mod secrets;
pub mod sendgrid;
pub mod wordpress;

pub use godaddy::{Availability, DomainRegistrar, GoDaddyClient};
pub use secrets::{EnvSecretStore, SecretStore, StaticSecretStore, MONETIZATION_SNIPPET};
pub use sendgrid::{Notifier, SendGridNotifier};
pub use wordpress::{classify_response, CmsClient, NewPost, PublishedPost, WordPressClient};

use std::time::Duration;

/// Timeout applied to every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("blogflow/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}
