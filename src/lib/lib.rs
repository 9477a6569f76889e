#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Email relay library: accepts send requests over HTTP and hands them to an
//! upstream SMTP server.

pub mod domain;
pub mod infrastructure;
