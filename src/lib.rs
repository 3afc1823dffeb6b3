//! Skimmed: hides feed items the reader has already scrolled past.
//!
//! An item counts as read once it has stayed in the viewport for the dwell
//! period. Read ids persist across sessions and are hidden on discovery
//! while hiding is enabled. The library is driven through [`app::App`] by a
//! host that reports document and viewport events; the `skimmed-bridge`
//! binary exposes it over stdin/stdout.

pub mod app;
pub mod bridge_handler;
pub mod database;
pub mod host;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
