pub mod config;
pub mod core;
pub mod error;
pub mod external_services;
pub mod models;
