//! Mailer module

mod errors;
mod message;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

pub use errors::MailerError;
pub use message::{EmailBody, EmailRequest, Recipients};

/// Delivers outbound email
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Sends a single email.
    ///
    /// # Arguments
    /// * `request` - The [`EmailRequest`] describing the message.
    ///
    /// # Returns
    /// [`Ok`] once the upstream server has accepted the message, or an [`Err`]
    /// containing a [`MailerError`] naming the stage that failed.
    async fn send_email(&self, request: &EmailRequest) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn send_email(&self, request: &EmailRequest) -> Result<(), MailerError>;
    }
}
