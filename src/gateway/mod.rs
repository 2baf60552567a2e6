// gateway module - provider-agnostic chat completion gateway

pub mod config;
pub mod handlers; // API endpoint handlers
pub mod mappers; // Provider wire-format mappers
pub mod middleware; // Axum middleware
pub mod server;
pub mod streaming; // Streamed-response relay
pub mod upstream; // Upstream client

pub use config::GatewayConfig;
pub use server::{AppState, GatewayServer};
