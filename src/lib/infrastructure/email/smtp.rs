//! SMTP mailer implementation

use std::{fmt, time::Duration};

use async_trait::async_trait;
use clap::{builder::NonEmptyStringValueParser, ArgAction, Parser};
use lettre::{
    message::{header::ContentType, Mailbox, MessageBuilder},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        Error as SmtpError,
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{EmailBody, EmailRequest, Mailer, MailerError},
};

/// Reply codes the server uses to refuse authentication
const AUTHENTICATION_FAILURE_CODES: [&str; 4] = ["530", "534", "535", "538"];

/// Reply code for a refused STARTTLS upgrade
const TLS_UNAVAILABLE_CODE: &str = "454";

/// SMTP configuration
#[derive(Clone, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[arg(long = "smtp-server", env = "SMTP_SERVER", value_parser = NonEmptyStringValueParser::new())]
    pub smtp_server: String,

    /// The SMTP port
    #[arg(long = "smtp-port", env = "SMTP_PORT", default_value_t = 587)]
    pub port: u16,

    /// The SMTP username
    #[arg(long = "smtp-username", env = "SMTP_USERNAME")]
    pub username: Option<String>,

    /// The SMTP password
    #[arg(long = "smtp-password", env = "SMTP_PASSWORD")]
    pub password: Option<String>,

    /// The sender display name
    #[arg(long = "smtp-from-name", env = "SMTP_FROM_NAME", value_parser = NonEmptyStringValueParser::new())]
    pub from_name: String,

    /// The sender email address
    #[arg(long = "smtp-from-email", env = "SMTP_FROM_EMAIL", value_parser = NonEmptyStringValueParser::new())]
    pub from_email: String,

    /// Upgrade the connection with STARTTLS
    #[arg(long = "smtp-use-ssl", env = "SMTP_USE_SSL", default_value_t = true, action = ArgAction::Set)]
    pub use_ssl: bool,

    /// Fail instead of continuing in cleartext when the server does not offer STARTTLS
    #[arg(long = "smtp-require-tls", env = "SMTP_REQUIRE_TLS", default_value_t = false, action = ArgAction::Set)]
    pub require_tls: bool,

    /// Verify the server certificate and hostname
    #[arg(long = "smtp-verify-certificates", env = "SMTP_VERIFY_CERTIFICATES", default_value_t = false, action = ArgAction::Set)]
    pub verify_certificates: bool,

    /// Connection and command timeout in seconds
    #[arg(long = "smtp-timeout-secs", env = "SMTP_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl fmt::Debug for SMTPConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SMTPConfig")
            .field("smtp_server", &self.smtp_server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("from_name", &self.from_name)
            .field("from_email", &self.from_email)
            .field("use_ssl", &self.use_ssl)
            .field("require_tls", &self.require_tls)
            .field("verify_certificates", &self.verify_certificates)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// How the SMTP connection is secured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Plain connection, STARTTLS is never issued
    None,

    /// Cleartext connection upgraded with STARTTLS before authenticating
    StartTls {
        /// Abort when the server does not offer STARTTLS
        required: bool,

        /// Check the server certificate and hostname
        verify_certificates: bool,
    },
}

/// SMTP mailer
#[derive(Debug, Clone)]
pub struct SMTPMailer {
    config: SMTPConfig,
    sender: Mailbox,
}

impl SMTPMailer {
    /// Create a new SMTP mailer, validating the sender identity
    pub fn new(config: SMTPConfig) -> Result<Self, MailerError> {
        let address = parse_address(config.from_email.trim())?;
        let name = Some(config.from_name.clone()).filter(|name| !name.trim().is_empty());

        Ok(Self {
            sender: Mailbox::new(name, address),
            config,
        })
    }

    /// Builds the MIME message for `request`.
    ///
    /// Recipients carry no display name. Exactly one body part is emitted,
    /// `text/html` or `text/plain` depending on the request.
    pub fn compose(&self, request: &EmailRequest) -> Result<Message, MailerError> {
        let recipients = request.recipients()?;

        if recipients.to.is_empty() {
            return Err(MailerError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(request.subject.clone());

        for address in &recipients.to {
            builder = builder.to(mailbox(address)?);
        }

        for address in &recipients.cc {
            builder = builder.cc(mailbox(address)?);
        }

        for address in &recipients.bcc {
            builder = builder.bcc(mailbox(address)?);
        }

        with_body(builder, request.body())
            .map_err(|err| MailerError::InvalidMessage(err.to_string()))
    }

    /// The transport security applied to each connection
    pub fn security(&self) -> TransportSecurity {
        if self.config.use_ssl {
            TransportSecurity::StartTls {
                required: self.config.require_tls,
                verify_certificates: self.config.verify_certificates,
            }
        } else {
            TransportSecurity::None
        }
    }

    /// Credentials to authenticate with, when both username and password are set
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.config.username.as_deref().unwrap_or_default();
        let password = self.config.password.as_deref().unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return None;
        }

        Some(Credentials::new(username.to_string(), password.to_string()))
    }

    /// Builds a single-use transport; pooling is compiled out, so each send
    /// opens a connection and closes it with `QUIT` once the message is accepted.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.config.smtp_server.as_str())
                .port(self.config.port)
                .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        if let TransportSecurity::StartTls {
            required,
            verify_certificates,
        } = self.security()
        {
            let parameters = TlsParameters::builder(self.config.smtp_server.clone())
                .dangerous_accept_invalid_certs(!verify_certificates)
                .dangerous_accept_invalid_hostnames(!verify_certificates)
                .build()
                .map_err(|err| MailerError::Transport(err.to_string()))?;

            builder = builder.tls(if required {
                Tls::Required(parameters)
            } else {
                Tls::Opportunistic(parameters)
            });
        }

        if let Some(credentials) = self.credentials() {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SMTPMailer {
    async fn send_email(&self, request: &EmailRequest) -> Result<(), MailerError> {
        let message = self.compose(request)?;
        let recipients = message.envelope().to().len();

        debug!(
            host = %self.config.smtp_server,
            port = self.config.port,
            security = ?self.security(),
            authenticated = self.credentials().is_some(),
            recipients,
            "dispatching email"
        );

        let transport = self.transport()?;
        transport
            .send(message)
            .await
            .map_err(|err| classify(err, self.security()))?;

        info!(recipients, subject = %request.subject, "email handed off to SMTP server");

        Ok(())
    }
}

fn with_body(
    builder: MessageBuilder,
    body: EmailBody<'_>,
) -> Result<Message, lettre::error::Error> {
    match body {
        EmailBody::Html(html) => builder.header(ContentType::TEXT_HTML).body(html.to_string()),
        EmailBody::Plain(text) => builder.header(ContentType::TEXT_PLAIN).body(text.to_string()),
    }
}

fn parse_address(raw: &str) -> Result<Address, MailerError> {
    raw.parse()
        .map_err(|_| MailerError::InvalidAddress(raw.to_string()))
}

fn mailbox(address: &EmailAddress) -> Result<Mailbox, MailerError> {
    Ok(Mailbox::new(None, parse_address(address.as_str())?))
}

/// Maps a transport error to the session stage that produced it.
///
/// With STARTTLS enabled a 454 reply is a refused upgrade. A temporary AUTH
/// failure sent with the same code lands there too.
fn classify(err: SmtpError, security: TransportSecurity) -> MailerError {
    let cause = err.to_string();
    let code = err.status().map(|code| code.to_string());

    match code.as_deref() {
        Some(TLS_UNAVAILABLE_CODE) if security != TransportSecurity::None => {
            MailerError::Transport(cause)
        }
        Some(code) if AUTHENTICATION_FAILURE_CODES.contains(&code) => {
            MailerError::Authentication(cause)
        }
        Some(_) => MailerError::Rejected(cause),
        None => MailerError::Transport(cause),
    }
}
