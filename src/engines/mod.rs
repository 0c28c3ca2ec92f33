//! Clients for the translation providers

pub mod deepl;
pub mod google;
