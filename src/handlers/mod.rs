// src/handlers/mod.rs
pub mod analysis;
pub mod error;
pub mod scrape;
