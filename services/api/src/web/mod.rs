pub mod auth;
pub mod dto;
pub mod middleware;
pub mod plans;
pub mod rest;
pub mod shopping;
pub mod state;

pub use middleware::require_auth;
