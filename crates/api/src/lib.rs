//! HTTP API for the accounts service: configuration, routing, and
//! request/response mapping.

pub mod app;
pub mod config;
