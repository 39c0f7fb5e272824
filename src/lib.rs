pub mod api_types;
pub mod client;
pub mod config;
pub mod cors;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod rules;
