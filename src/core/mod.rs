//! Core comparison and usage accounting

pub mod assistant;
pub mod config;
pub mod errors;
pub mod models;
pub mod usage_tracker;
