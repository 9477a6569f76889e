//! Email delivery adapters

pub mod smtp;

#[cfg(test)]
mod test_server;
