//! Outbound email: addresses, requests and the mailer seam

pub mod email_addresses;
pub mod mailer;
