//! Internal modules for the dice game client.
//!
//! This library provides configuration, logging, the HTTP API client, the
//! game socket and both frontends used by the dd_client binary.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod driver;
pub mod logging;
pub mod tui_app;
pub mod websocket_client;
