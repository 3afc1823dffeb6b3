// Skimmed state managers
// Managers drive the per-item state machine, the document sync loop, the toggle and the affordance.

pub mod affordance_installer;
pub mod feed_sync;
pub mod toggle_controller;
pub mod visibility_reconciler;
