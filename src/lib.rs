pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod client;
pub mod contracts;
pub mod routes;
