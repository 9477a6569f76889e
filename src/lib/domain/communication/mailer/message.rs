//! Email request

use crate::domain::communication::email_addresses::{EmailAddress, EmailAddressError};

/// A request to send one email
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailRequest {
    /// Semicolon-delimited primary recipients
    pub to: String,

    /// Semicolon-delimited carbon-copy recipients
    pub cc: Option<String>,

    /// Semicolon-delimited blind carbon-copy recipients
    pub bcc: Option<String>,

    /// The subject, used verbatim
    pub subject: String,

    /// The body, interpreted according to `is_html`
    pub body: String,

    /// Whether the body is HTML rather than plain text
    pub is_html: bool,
}

/// The body of an email, either HTML or plain text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmailBody<'a> {
    /// An HTML body
    Html(&'a str),

    /// A plain text body
    Plain(&'a str),
}

/// Parsed recipients of an [`EmailRequest`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recipients {
    /// Primary recipients
    pub to: Vec<EmailAddress>,

    /// Carbon-copy recipients
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy recipients
    pub bcc: Vec<EmailAddress>,
}

impl EmailRequest {
    /// Parses the `to`, `cc` and `bcc` address lists.
    pub fn recipients(&self) -> Result<Recipients, EmailAddressError> {
        Ok(Recipients {
            to: EmailAddress::parse_list(&self.to)?,
            cc: parse_optional_list(self.cc.as_deref())?,
            bcc: parse_optional_list(self.bcc.as_deref())?,
        })
    }

    /// Returns the body tagged with its MIME flavour.
    pub fn body(&self) -> EmailBody<'_> {
        if self.is_html {
            EmailBody::Html(&self.body)
        } else {
            EmailBody::Plain(&self.body)
        }
    }
}

fn parse_optional_list(raw: Option<&str>) -> Result<Vec<EmailAddress>, EmailAddressError> {
    raw.map(EmailAddress::parse_list)
        .transpose()
        .map(Option::unwrap_or_default)
}
