//! Mailer errors

use thiserror::Error;

use crate::domain::communication::email_addresses::EmailAddressError;

/// Errors raised while composing or delivering an email
#[derive(Debug, Error)]
pub enum MailerError {
    /// The primary recipient list is empty
    #[error("At least one recipient is required")]
    NoRecipients,

    /// An address could not be used
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled
    #[error("Could not build the email message: {0}")]
    InvalidMessage(String),

    /// The connection to the SMTP server failed
    #[error("Could not connect to the SMTP server: {0}")]
    Transport(String),

    /// The SMTP server rejected the credentials
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    /// The SMTP server rejected a command during the session
    #[error("The SMTP server rejected the email: {0}")]
    Rejected(String),
}

impl From<EmailAddressError> for MailerError {
    fn from(err: EmailAddressError) -> Self {
        match err {
            EmailAddressError::EmptyEmailAddress => {
                MailerError::InvalidAddress("email is empty".to_string())
            }
            EmailAddressError::InvalidEmailAddress(address) => {
                MailerError::InvalidAddress(address)
            }
        }
    }
}
