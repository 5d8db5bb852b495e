pub mod adapters;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod state;
pub mod views;
