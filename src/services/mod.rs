// Skimmed services
// Services hold the persisted state and the primitives the managers build on:
// storage, the read store, timers and settings.

pub mod dwell_timer;
pub mod read_store;
pub mod settings_engine;
pub mod storage;
pub mod tracker_state;
