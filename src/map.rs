//! The campaign map screen's single logical owner.
//!
//! [`CampaignMap`] holds the waypoint graph, the player's progression and the
//! two controllers, and is the one place the host marshals pointer input and
//! frame ticks onto. Every input call returns the [`MapEvent`]s it produced.

use crate::campaign::CampaignGraph;
use crate::config::MapConfig;
use crate::error::CampaignError;
use crate::model::{MapEvent, Vec2, Waypoint, WaypointStatus};
use crate::progression::{ProgressStore, ProgressionModel};
use crate::state::{EdgeRoom, GestureController, GesturePhase, ViewportController};

pub struct CampaignMap {
    cfg: MapConfig,
    campaign: CampaignGraph,
    progression: ProgressionModel,
    viewport: ViewportController,
    gestures: GestureController,
}

impl CampaignMap {
    /// Builds the map, loads progress and puts the frontier sector in view.
    pub fn new(config: MapConfig, sectors: Vec<Waypoint>, store: Box<dyn ProgressStore>) -> Result<Self, CampaignError> {
        let cfg = config.sanitized();
        let campaign = CampaignGraph::new(sectors, cfg.content_margin)?;
        let progression = ProgressionModel::load(campaign.len(), store, cfg.unlock_all);
        let mut viewport = ViewportController::new(campaign.bounds(), &cfg);
        let frontier = campaign.position(progression.highest_unlocked_rank())?;
        viewport.jump_to(frontier);
        tracing::info!(
            "campaign map ready: {} sectors, frontier {}",
            campaign.len(),
            progression.highest_unlocked_rank()
        );
        Ok(Self {
            gestures: GestureController::new(&cfg),
            cfg,
            campaign,
            progression,
            viewport,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.cfg
    }

    pub fn campaign(&self) -> &CampaignGraph {
        &self.campaign
    }

    pub fn progression(&self) -> &ProgressionModel {
        &self.progression
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gestures.phase()
    }

    pub fn waypoint_status(&self, rank: u32) -> WaypointStatus {
        self.progression.waypoint_status(rank)
    }

    /// Selecting the last sector of a finished campaign replays the
    /// celebration instead of opening a briefing.
    pub fn is_finale(&self, rank: u32) -> bool {
        rank == self.campaign.len() && self.progression.is_campaign_complete()
    }

    pub fn edge_room(&self) -> EdgeRoom {
        self.viewport.edge_room()
    }

    /// True while the camera moves without input, so the host keeps ticking.
    pub fn is_in_motion(&self) -> bool {
        self.viewport.is_decelerating() || self.viewport.is_animating()
    }

    // ---------------- input -----------------

    pub fn pointer_down(&mut self, pos: Vec2, t: f64) -> Vec<MapEvent> {
        self.gestures.pointer_down(pos, t, &mut self.viewport);
        Vec::new()
    }

    pub fn pointer_move(&mut self, pos: Vec2, t: f64) -> Vec<MapEvent> {
        let mut events = Vec::new();
        self.gestures.pointer_move(pos, t, &mut self.viewport, &mut events);
        events
    }

    pub fn pointer_up(&mut self, pos: Vec2, t: f64) -> Vec<MapEvent> {
        let mut events = Vec::new();
        self.gestures.pointer_up(
            pos,
            t,
            &mut self.viewport,
            &self.campaign,
            &self.progression,
            &mut events,
        );
        events
    }

    pub fn pointer_cancel(&mut self) -> Vec<MapEvent> {
        self.gestures.pointer_cancel(&mut self.viewport);
        Vec::new()
    }

    /// Two-finger zoom. Emits the (unchanged) offset when the scale moved so
    /// listeners can redraw the visible area.
    pub fn pinch(&mut self, previous_distance: f64, current_distance: f64) -> Vec<MapEvent> {
        if self.gestures.pinch(previous_distance, current_distance, &mut self.viewport) {
            vec![MapEvent::ScrollChanged(self.viewport.offset())]
        } else {
            Vec::new()
        }
    }

    /// Frame callback driving deceleration and focus tweens.
    pub fn tick(&mut self, dt: f64) -> Vec<MapEvent> {
        if self.viewport.tick(dt) {
            vec![MapEvent::ScrollChanged(self.viewport.offset())]
        } else {
            Vec::new()
        }
    }

    // ---------------- commands -----------------

    /// Inbound from gameplay when a sector is won. The camera glides to the
    /// (possibly new) frontier.
    pub fn level_completed(&mut self, rank: u32) -> Result<(), CampaignError> {
        self.progression.mark_completed(rank)?;
        self.focus_current();
        Ok(())
    }

    /// Starts a tween to the frontier sector.
    pub fn focus_current(&mut self) {
        let rank = self.progression.highest_unlocked_rank();
        if let Err(e) = self.viewport.focus_on(&self.campaign, rank) {
            tracing::error!("cannot focus frontier: {}", e);
        }
    }

    pub fn zoom_by(&mut self, factor: f64) -> bool {
        self.viewport.zoom_by(factor)
    }

    /// Button-driven pan by `delta` content units; stops a momentum glide
    /// first. Ignored mid-gesture and while a focus tween runs.
    pub fn nudge(&mut self, delta: Vec2) -> Vec<MapEvent> {
        if self.gestures.phase() != GesturePhase::None || self.viewport.is_animating() {
            return Vec::new();
        }
        self.viewport.interrupt();
        if self.viewport.pan(delta) {
            vec![MapEvent::ScrollChanged(self.viewport.offset())]
        } else {
            Vec::new()
        }
    }

    pub fn set_unlock_all(&mut self, on: bool) {
        self.cfg.unlock_all = on;
        self.progression.set_unlock_all(on);
    }

    /// Wipes progress and brings sector 1 back into view.
    pub fn reset_progress(&mut self) {
        self.progression.reset();
        self.focus_current();
    }
}
