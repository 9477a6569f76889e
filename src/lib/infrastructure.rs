//! Adapters for the outside world: SMTP delivery and the HTTP API

pub mod email;
pub mod http;
