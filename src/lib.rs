pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod data_models;
pub mod error;
pub mod render;
pub mod search_box;
pub mod trigger;
