//! Host ports and the in-process host mirror.
//!
//! [`Host`] bundles every port the engine drives besides storage. The
//! [`HostMirror`] implementation keeps a copy of the document built from the
//! events it is shown, and turns every port call into a [`HostCommand`] for
//! the real host to apply.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use log::debug;

use crate::managers::affordance_installer::HostUi;
use crate::managers::feed_sync::FeedDocument;
use crate::services::dwell_timer::{Scheduler, TimerQueue};
use crate::types::dom::{collect_feed_items, DomNode, FeedSelector};
use crate::types::errors::AffordanceError;
use crate::types::event::{FeedEvent, HostCommand};
use crate::types::feed::{FeedItemId, TimerHandle, TimerKind};
use crate::types::settings::{AffordanceSettings, TrackerSettings};

/// Everything the engine needs from its host page.
pub trait Host: FeedDocument + Scheduler + HostUi {
    /// Sees every event before the engine does.
    fn sync_document(&mut self, _event: &FeedEvent) {}
}

pub struct HostMirror {
    roots: Vec<DomNode>,
    landmarks: Landmarks,
    hidden_class: String,
    affordance: AffordanceSettings,
    observed: BTreeSet<FeedItemId>,
    hidden: BTreeSet<FeedItemId>,
    timers: TimerQueue,
    /// Anchor the affordance was inserted after, while that anchor is mirrored.
    inserted_after: Option<String>,
    outbox: Vec<HostCommand>,
}

impl HostMirror {
    pub fn new(settings: &TrackerSettings) -> Self {
        Self {
            roots: Vec::new(),
            landmarks: Landmarks {
                selector: settings.feed.selector.clone(),
                tab_class: settings.affordance.panel_tab_class.clone(),
                affordance_id: settings.affordance.affordance_id.clone(),
            },
            hidden_class: settings.feed.hidden_class.clone(),
            affordance: settings.affordance.clone(),
            observed: BTreeSet::new(),
            hidden: BTreeSet::new(),
            timers: TimerQueue::new(),
            inserted_after: None,
            outbox: Vec::new(),
        }
    }

    /// Takes every command queued since the last drain.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Fires the earliest timer due by `until_ms` on the virtual clock.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerHandle> {
        self.timers.pop_due(until_ms)
    }

    pub fn set_now(&mut self, now_ms: u64) {
        self.timers.set_now(now_ms);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    pub fn is_hidden(&self, id: &FeedItemId) -> bool {
        self.hidden.contains(id)
    }

    pub fn is_observed(&self, id: &FeedItemId) -> bool {
        self.observed.contains(id)
    }

    /// The mirrored document, reduced to feed items, panel tabs and the affordance.
    pub fn roots(&self) -> &[DomNode] {
        &self.roots
    }

    fn remove_subtrees(&mut self, removed: &[DomNode]) {
        let gone = self.landmarks.in_subtrees(removed);
        self.landmarks.prune(&mut self.roots, &gone);
        // Markers die with the element.
        for mark in &gone {
            if let Landmark::Item(id) = mark {
                self.hidden.remove(id);
            }
        }

        let anchor_gone = self
            .inserted_after
            .as_ref()
            .map_or(false, |anchor| gone.contains(&Landmark::Tab(anchor.clone())));
        if anchor_gone || gone.contains(&Landmark::Affordance) {
            self.inserted_after = None;
            debug!("event=affordance_detached module=host");
        }
    }
}

/// The parts of a node the mirror keeps track of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Landmark {
    Item(FeedItemId),
    /// Panel tab, keyed by its `href`.
    Tab(String),
    Affordance,
}

struct Landmarks {
    selector: FeedSelector,
    tab_class: String,
    affordance_id: String,
}

impl Landmarks {
    fn of(&self, node: &DomNode) -> Option<Landmark> {
        if let Some(id) = node.feed_item_id(&self.selector) {
            return Some(Landmark::Item(id));
        }
        if node.attribute("id") == Some(self.affordance_id.as_str()) {
            return Some(Landmark::Affordance);
        }
        if node.has_class(&self.tab_class) {
            let href = node.attribute("href").unwrap_or_default();
            return Some(Landmark::Tab(href.to_string()));
        }
        None
    }

    fn in_subtrees(&self, nodes: &[DomNode]) -> HashSet<Landmark> {
        nodes
            .iter()
            .flat_map(|node| node.descendants())
            .filter_map(|node| self.of(node))
            .collect()
    }

    /// Drops every subtree without a landmark, keeping the nesting of the rest.
    fn compact(&self, nodes: &[DomNode]) -> Vec<DomNode> {
        nodes
            .iter()
            .filter_map(|node| {
                let children = self.compact(&node.children);
                if self.of(node).is_none() && children.is_empty() {
                    return None;
                }
                Some(DomNode {
                    tag: node.tag.clone(),
                    attributes: node.attributes.clone(),
                    children,
                })
            })
            .collect()
    }

    /// Removes the nodes whose landmark is in `gone`, then the wrappers left empty.
    fn prune(&self, nodes: &mut Vec<DomNode>, gone: &HashSet<Landmark>) {
        nodes.retain(|node| self.of(node).map_or(true, |mark| !gone.contains(&mark)));
        for node in nodes.iter_mut() {
            self.prune(&mut node.children, gone);
        }
        nodes.retain(|node| self.of(node).is_some() || !node.children.is_empty());
    }
}

impl Host for HostMirror {
    fn sync_document(&mut self, event: &FeedEvent) {
        match event {
            FeedEvent::DocumentSnapshot { roots } => {
                self.roots = self.landmarks.compact(roots);
                // A fresh read of the page shows the affordance if it is still there.
                self.inserted_after = None;
                debug!(
                    "event=document_snapshot module=host roots={}",
                    self.roots.len()
                );
            }
            FeedEvent::NodesInserted { nodes } => {
                let kept = self.landmarks.compact(nodes);
                self.roots.extend(kept);
            }
            FeedEvent::NodesRemoved { nodes } => self.remove_subtrees(nodes),
            _ => {}
        }
    }
}

impl FeedDocument for HostMirror {
    fn feed_items(&self) -> Vec<FeedItemId> {
        collect_feed_items(&self.roots, &self.landmarks.selector)
    }

    fn observe(&mut self, id: &FeedItemId) {
        if self.observed.insert(id.clone()) {
            self.outbox.push(HostCommand::Observe { id: id.clone() });
        }
    }

    fn unobserve(&mut self, id: &FeedItemId) {
        if self.observed.remove(id) {
            self.outbox.push(HostCommand::Unobserve { id: id.clone() });
        }
    }

    fn set_hidden(&mut self, id: &FeedItemId, hidden: bool) {
        let changed = if hidden {
            self.hidden.insert(id.clone())
        } else {
            self.hidden.remove(id)
        };
        if !changed {
            return;
        }
        let class = self.hidden_class.clone();
        self.outbox.push(if hidden {
            HostCommand::Hide { id: id.clone(), class }
        } else {
            HostCommand::Show { id: id.clone(), class }
        });
    }

    fn hidden_items(&self) -> Vec<FeedItemId> {
        self.hidden.iter().cloned().collect()
    }
}

impl Scheduler for HostMirror {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let handle = self.timers.schedule(delay, kind);
        self.outbox.push(HostCommand::ScheduleTimer {
            handle,
            delay_ms: delay.as_millis() as u64,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
        self.outbox.push(HostCommand::CancelTimer { handle });
    }

    fn take_fired(&mut self, handle: TimerHandle) -> Option<TimerKind> {
        self.timers.take_fired(handle)
    }
}

impl HostUi for HostMirror {
    fn find_anchor(&self) -> Option<String> {
        self.roots
            .iter()
            .flat_map(|root| root.descendants())
            .find(|node| {
                node.has_class(&self.affordance.panel_tab_class)
                    && node.attribute("href") == Some(self.affordance.anchor_href.as_str())
            })
            .map(|_| self.affordance.anchor_href.clone())
    }

    fn affordance_present(&self) -> bool {
        self.inserted_after.is_some()
            || self
                .landmarks
                .in_subtrees(&self.roots)
                .contains(&Landmark::Affordance)
    }

    fn insert_affordance(&mut self, anchor: &str, enabled: bool) -> Result<(), AffordanceError> {
        if anchor != self.affordance.anchor_href {
            return Err(AffordanceError::InsertFailed(format!(
                "unknown anchor {}",
                anchor
            )));
        }
        self.inserted_after = Some(anchor.to_string());
        self.outbox.push(HostCommand::InsertToggle {
            anchor: anchor.to_string(),
            affordance_id: self.affordance.affordance_id.clone(),
            enabled,
        });
        Ok(())
    }

    fn render_affordance(&mut self, enabled: bool) {
        if self.affordance_present() {
            self.outbox.push(HostCommand::RenderToggle { enabled });
        }
    }
}
