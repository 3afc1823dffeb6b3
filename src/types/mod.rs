// Skimmed shared type definitions
// Each submodule defines types used across the engine, the host mirror and the bridge.

pub mod dom;
pub mod errors;
pub mod event;
pub mod feed;
pub mod settings;
