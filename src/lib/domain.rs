//! Domain types and traits

pub mod communication;
