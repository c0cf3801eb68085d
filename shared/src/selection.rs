//! Selection and hover state for the place list and its markers.
//!
//! [`SelectionState::apply`] is a pure transition: it mutates the
//! `(selected, hovered, deselect_suppressed)` triple and returns the
//! [`Command`]s the host must carry out. It never talks to the map itself.
//!
//! Selecting a place recenters the map, and the widget reports that move as a
//! pan start like any other. To keep a fresh selection from being undone by
//! its own recenter, each selection opens a grace window during which pan
//! starts are ignored. Only the grace timer armed by the latest selection can
//! close the window.

use std::time::Duration;

use tracing::debug;

use crate::capabilities::{TimerId, TimerPurpose};
use crate::dataset::PlaceId;
use crate::geo::LatLon;
use crate::schedule::TimerSlot;

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Pointer entered a list row or marker.
    Hover(PlaceId),
    /// Pointer left a list row or marker.
    Unhover(PlaceId),
    /// List row or marker clicked.
    Select { id: PlaceId, position: LatLon },
    /// The widget closed the popup of a place (user dismissed it).
    PopupClosed(PlaceId),
    /// Click on the map background, not on a marker.
    MapClick,
    PanStart,
    GraceElapsed(TimerId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenPopup(PlaceId),
    ClosePopup(PlaceId),
    CloseAllPopups,
    Recenter(LatLon),
    ClearRecenter,
    StartTimer { id: TimerId, after: Duration },
    CancelTimer(TimerId),
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    selected: Option<PlaceId>,
    hovered: Option<PlaceId>,
    deselect_suppressed: bool,
    grace: TimerSlot,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected: None,
            hovered: None,
            deselect_suppressed: false,
            grace: TimerSlot::new(TimerPurpose::Grace),
        }
    }
}

impl SelectionState {
    pub fn selected(&self) -> Option<&PlaceId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&PlaceId> {
        self.hovered.as_ref()
    }

    pub fn deselect_suppressed(&self) -> bool {
        self.deselect_suppressed
    }

    pub fn is_selected(&self, id: &PlaceId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn is_hovered(&self, id: &PlaceId) -> bool {
        self.hovered.as_ref() == Some(id)
    }

    pub fn apply(&mut self, trigger: Trigger, grace: Duration) -> Vec<Command> {
        match trigger {
            Trigger::Hover(id) => {
                self.hovered = Some(id.clone());
                vec![Command::OpenPopup(id)]
            }

            Trigger::Unhover(id) => {
                if self.is_hovered(&id) {
                    self.hovered = None;
                }
                if self.is_selected(&id) {
                    Vec::new()
                } else {
                    vec![Command::ClosePopup(id)]
                }
            }

            Trigger::Select { id, position } => {
                debug!(place = %id, "place selected");
                self.selected = Some(id.clone());
                self.deselect_suppressed = true;

                let rearm = self.grace.arm();
                let mut commands = Vec::with_capacity(4);
                if let Some(stale) = rearm.cancel {
                    commands.push(Command::CancelTimer(stale));
                }
                commands.push(Command::StartTimer {
                    id: rearm.start,
                    after: grace,
                });
                commands.push(Command::OpenPopup(id));
                commands.push(Command::Recenter(position));
                commands
            }

            Trigger::PopupClosed(id) => {
                if self.is_selected(&id) {
                    debug!(place = %id, "popup closed, clearing selection");
                    self.selected = None;
                }
                vec![Command::ClearRecenter]
            }

            Trigger::MapClick => {
                self.selected = None;
                vec![Command::CloseAllPopups, Command::ClearRecenter]
            }

            Trigger::PanStart => {
                if self.deselect_suppressed {
                    debug!("pan start inside grace window, selection kept");
                    Vec::new()
                } else {
                    self.selected = None;
                    vec![Command::CloseAllPopups]
                }
            }

            Trigger::GraceElapsed(id) => {
                if self.grace.fire(id) {
                    self.deselect_suppressed = false;
                } else {
                    debug!(timer = %id, "ignoring superseded grace timer");
                }
                Vec::new()
            }
        }
    }

    /// Returns to the initial triple and disarms the grace timer, returning
    /// it so the caller can cancel it. The timer generation keeps counting,
    /// so a firing from before the reset can never match a later timer.
    pub fn reset(&mut self) -> Option<TimerId> {
        self.selected = None;
        self.hovered = None;
        self.deselect_suppressed = false;
        self.grace.disarm()
    }

    /// Drops the selection and hover if they name a place outside `known`.
    pub fn retain(&mut self, known: impl Fn(&PlaceId) -> bool) {
        if self.selected.as_ref().is_some_and(|id| !known(id)) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|id| !known(id)) {
            self.hovered = None;
        }
    }
}
