pub mod adapters;
pub mod config;
pub mod error;
pub mod planning;
pub mod web;
