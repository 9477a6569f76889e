//! HTTP and HTTPS listeners

pub mod http;
pub mod https;
