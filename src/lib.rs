// The binary in main.rs owns the terminal; everything it drives lives here so
// the integration tests can run the same flows headlessly.

pub mod app;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod provider;
pub mod router;
pub mod session;
pub mod speech;
pub mod store;
pub mod ui;
pub mod worker;
