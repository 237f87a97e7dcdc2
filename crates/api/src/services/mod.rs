//! Outbound service clients.

pub mod suggestion;
