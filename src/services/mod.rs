// src/services/mod.rs
pub mod calculations;
pub mod extractor;
pub mod forecast;
pub mod pipeline;
pub mod repository;
pub mod source;
pub mod store;
