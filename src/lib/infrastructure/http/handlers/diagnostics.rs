//! Diagnostic handlers

pub mod send_test_email;
pub mod service_info;
