//! Affordance Installer.
//!
//! The toggle affordance lives in a host navigation panel that may render
//! late. Insertion is attempted on a fixed schedule after start-up and every
//! time a mutation batch brings in a panel tab. Failed attempts are logged
//! and left for the next trigger.

use std::time::Duration;

use log::{debug, info, warn};

use crate::services::dwell_timer::Scheduler;
use crate::types::dom::DomNode;
use crate::types::errors::AffordanceError;
use crate::types::feed::TimerKind;
use crate::types::settings::AffordanceSettings;

/// Host UI surface for the toggle affordance.
pub trait HostUi {
    /// Identifier of the panel element the affordance goes after, once rendered.
    fn find_anchor(&self) -> Option<String>;
    fn affordance_present(&self) -> bool;
    /// Inserts the affordance right after `anchor`, showing `enabled`.
    fn insert_affordance(&mut self, anchor: &str, enabled: bool) -> Result<(), AffordanceError>;
    /// Redraws the affordance for the current flag.
    fn render_affordance(&mut self, enabled: bool);
}

pub struct AffordanceInstaller {
    retry_schedule: Vec<Duration>,
    panel_tab_class: String,
    installed: bool,
}

impl AffordanceInstaller {
    pub fn new(settings: &AffordanceSettings) -> Self {
        Self {
            retry_schedule: settings
                .retry_schedule_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            panel_tab_class: settings.panel_tab_class.clone(),
            installed: false,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Schedules every fixed-schedule attempt, each delay measured from now.
    pub fn schedule_retries<T: Scheduler + ?Sized>(&self, scheduler: &mut T) {
        for (attempt, delay) in self.retry_schedule.iter().enumerate() {
            scheduler.schedule(*delay, TimerKind::AffordanceRetry { attempt });
        }
    }

    /// Whether a mutation batch brought in at least one panel tab.
    pub fn panel_appeared(&self, nodes: &[DomNode]) -> bool {
        nodes.iter().any(|node| node.contains_class(&self.panel_tab_class))
    }

    /// One insertion attempt.
    pub fn try_install<U: HostUi + ?Sized>(
        &mut self,
        ui: &mut U,
        enabled: bool,
    ) -> Result<(), AffordanceError> {
        let Some(anchor) = ui.find_anchor() else {
            debug!("event=affordance_install module=affordance status=no_anchor");
            return Err(AffordanceError::AnchorNotFound);
        };
        if ui.affordance_present() {
            self.installed = true;
            debug!("event=affordance_install module=affordance status=already_present");
            return Err(AffordanceError::AlreadyInserted);
        }
        match ui.insert_affordance(&anchor, enabled) {
            Ok(()) => {
                self.installed = true;
                info!(
                    "event=affordance_install module=affordance status=ok anchor={} enabled={}",
                    anchor, enabled
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=affordance_install module=affordance status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }
}
