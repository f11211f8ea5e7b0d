// Pointer gesture classification: tap-to-select versus drag-to-scroll.
//
// A press stays Pending until the summed absolute movement on either axis
// passes the drag threshold; from then on it is a Drag and can never resolve
// as a tap. Positions are view-space (content units around the view centre).
use crate::campaign::CampaignGraph;
use crate::config::MapConfig;
use crate::error::CampaignError;
use crate::model::{MapEvent, Vec2};
use crate::progression::ProgressionModel;

use super::viewport::ViewportController;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    None,
    Pending,
    Drag,
}

/// How a finished gesture was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Stray event with no gesture in progress.
    Ignored,
    /// Released before the drag threshold; `rank` is the waypoint hit, if any.
    Tap { rank: Option<u32> },
    Drag,
}

/// Bookkeeping for one pointer-down..up/cancel cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSession {
    pub start_position: Vec2,
    pub start_time: f64,
    pub last_position: Vec2,
    pub last_time: f64,
    /// Sum of absolute per-axis deltas.
    pub accumulated_displacement: Vec2,
    pub classified_as_drag: bool,
    /// View units per second, from the latest sample pair.
    pub instant_velocity: Vec2,
}

impl GestureSession {
    fn new(pos: Vec2, t: f64) -> Self {
        Self {
            start_position: pos,
            start_time: t,
            last_position: pos,
            last_time: t,
            accumulated_displacement: Vec2::ZERO,
            classified_as_drag: false,
            instant_velocity: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GestureController {
    session: Option<GestureSession>,
    drag_threshold: f64,
    velocity_stale_secs: f64,
    hit_radius: f64,
}

impl GestureController {
    pub fn new(cfg: &MapConfig) -> Self {
        Self {
            session: None,
            drag_threshold: cfg.drag_threshold,
            velocity_stale_secs: cfg.velocity_stale_secs,
            hit_radius: cfg.hit_radius,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        match &self.session {
            None => GesturePhase::None,
            Some(s) if s.classified_as_drag => GesturePhase::Drag,
            Some(_) => GesturePhase::Pending,
        }
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Opens a new gesture, stopping any glide or focus tween on the camera.
    pub fn pointer_down(&mut self, pos: Vec2, t: f64, viewport: &mut ViewportController) {
        if !pos.is_finite() {
            return;
        }
        if self.session.is_some() {
            tracing::debug!("gesture: pointer down during active gesture, restarting");
            if self.phase() == GesturePhase::Drag {
                viewport.release(Vec2::ZERO);
            }
        }
        viewport.interrupt();
        self.session = Some(GestureSession::new(pos, t));
    }

    pub fn pointer_move(
        &mut self,
        pos: Vec2,
        t: f64,
        viewport: &mut ViewportController,
        events: &mut Vec<MapEvent>,
    ) {
        let threshold = self.drag_threshold;
        let Some(s) = self.session.as_mut() else {
            tracing::debug!("gesture: move without pointer down ignored");
            return;
        };
        if !pos.is_finite() {
            return;
        }
        let delta = pos - s.last_position;
        let elapsed = t - s.last_time;
        if elapsed > 0.0 {
            s.instant_velocity = delta / elapsed;
            s.last_time = t;
        }
        s.last_position = pos;
        s.accumulated_displacement.x += delta.x.abs();
        s.accumulated_displacement.y += delta.y.abs();

        let mut pan_by = delta;
        if !s.classified_as_drag {
            let acc = s.accumulated_displacement;
            if acc.x > threshold || acc.y > threshold {
                s.classified_as_drag = true;
                viewport.begin_drag();
                // Catch the content up with the finger from where the press began.
                pan_by = pos - s.start_position;
                tracing::debug!("gesture: classified as drag after {:?}", acc);
            } else {
                return;
            }
        }
        // Content follows the finger, so the camera moves the opposite way.
        if viewport.pan(-pan_by / viewport.scale()) {
            events.push(MapEvent::ScrollChanged(viewport.offset()));
        }
    }

    pub fn pointer_up(
        &mut self,
        pos: Vec2,
        t: f64,
        viewport: &mut ViewportController,
        campaign: &CampaignGraph,
        progression: &ProgressionModel,
        events: &mut Vec<MapEvent>,
    ) -> GestureOutcome {
        let Some(last) = self.session.map(|s| s.last_position) else {
            tracing::debug!("gesture: pointer up without pointer down ignored");
            return GestureOutcome::Ignored;
        };
        if pos.is_finite() && pos != last {
            self.pointer_move(pos, t, viewport, events);
        }
        let Some(s) = self.session.take() else {
            return GestureOutcome::Ignored;
        };

        if s.classified_as_drag {
            let velocity = if t - s.last_time > self.velocity_stale_secs {
                Vec2::ZERO
            } else {
                s.instant_velocity
            };
            viewport.release(-velocity / viewport.scale());
            events.push(MapEvent::ScrollEnded);
            return GestureOutcome::Drag;
        }

        let world = viewport.view_to_world(s.last_position);
        let rank = campaign.hit_test(world, self.hit_radius / viewport.scale());
        if let Some(rank) = rank {
            match progression.attempt_select(rank) {
                Ok(accepted) => {
                    tracing::debug!("gesture: tap selected sector {}", accepted.rank);
                    events.push(MapEvent::WaypointSelected(accepted.rank));
                }
                Err(CampaignError::Locked { rank, required }) => {
                    tracing::debug!("gesture: tap on locked sector {} (needs {})", rank, required);
                    events.push(MapEvent::WaypointRejected { rank, required_rank: required });
                }
                Err(e) => tracing::error!("gesture: tap resolved to invalid sector: {}", e),
            }
        }
        GestureOutcome::Tap { rank }
    }

    /// Drops the gesture without resolving a tap. The camera stays where it is.
    pub fn pointer_cancel(&mut self, viewport: &mut ViewportController) {
        if let Some(s) = self.session.take() {
            if s.classified_as_drag {
                viewport.release(Vec2::ZERO);
            }
        }
    }

    /// Two-finger zoom by the change in finger spacing. Any pinch turns the
    /// gesture into a drag so lifting the fingers cannot select a sector.
    pub fn pinch(&mut self, previous_distance: f64, current_distance: f64, viewport: &mut ViewportController) -> bool {
        if let Some(s) = self.session.as_mut() {
            if !s.classified_as_drag {
                s.classified_as_drag = true;
                viewport.begin_drag();
            }
            s.instant_velocity = Vec2::ZERO;
        }
        if !(previous_distance > 0.0 && current_distance > 0.0) {
            return false;
        }
        let ratio = current_distance / previous_distance;
        ratio.is_finite() && viewport.zoom_by(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Waypoint;
    use crate::progression::MemoryStore;
    use crate::state::viewport::ViewportPhase;

    struct Rig {
        gestures: GestureController,
        viewport: ViewportController,
        campaign: CampaignGraph,
        progression: ProgressionModel,
        events: Vec<MapEvent>,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = MapConfig::default();
            let waypoints = (1..=3)
                .map(|rank| Waypoint {
                    rank,
                    position: Vec2::new((rank as f64 - 2.0) * 200.0, 0.0),
                    display_name: format!("S{}", rank),
                    waves: 3,
                })
                .collect();
            let campaign = CampaignGraph::new(waypoints, cfg.content_margin).unwrap();
            let viewport = ViewportController::new(campaign.bounds(), &cfg);
            Self {
                gestures: GestureController::new(&cfg),
                viewport,
                campaign,
                progression: ProgressionModel::load(3, Box::new(MemoryStore::default()), false),
                events: Vec::new(),
            }
        }

        fn down(&mut self, x: f64, y: f64, t: f64) {
            self.gestures.pointer_down(Vec2::new(x, y), t, &mut self.viewport);
        }

        fn mv(&mut self, x: f64, y: f64, t: f64) {
            self.gestures.pointer_move(Vec2::new(x, y), t, &mut self.viewport, &mut self.events);
        }

        fn up(&mut self, x: f64, y: f64, t: f64) -> GestureOutcome {
            self.gestures.pointer_up(
                Vec2::new(x, y),
                t,
                &mut self.viewport,
                &self.campaign,
                &self.progression,
                &mut self.events,
            )
        }
    }

    #[test]
    fn still_press_on_waypoint_selects_it() {
        // Camera starts at the centre of the bounds, which is rank 2's position.
        let mut rig = Rig::new();
        rig.progression.mark_completed(1).unwrap();
        rig.down(2.0, 1.0, 0.0);
        rig.mv(3.0, 2.0, 0.05);
        assert_eq!(rig.up(3.0, 2.0, 0.1), GestureOutcome::Tap { rank: Some(2) });
        assert_eq!(rig.events, vec![MapEvent::WaypointSelected(2)]);
        assert_eq!(rig.gestures.phase(), GesturePhase::None);
    }

    #[test]
    fn tap_on_locked_waypoint_is_rejected() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, 0.0);
        rig.up(0.0, 0.0, 0.05);
        assert_eq!(rig.events, vec![MapEvent::WaypointRejected { rank: 2, required_rank: 1 }]);
    }

    #[test]
    fn tap_on_empty_space_emits_nothing() {
        let mut rig = Rig::new();
        rig.down(100.0, 100.0, 0.0);
        assert_eq!(rig.up(100.0, 100.0, 0.05), GestureOutcome::Tap { rank: None });
        assert!(rig.events.is_empty());
    }

    #[test]
    fn jitter_accumulates_into_drag() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, 0.0);
        // Net displacement stays within 1 unit, cumulative passes 5.
        for i in 0..4 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            rig.mv(x * 1.0, 0.0, 0.01 * (i + 1) as f64);
            rig.mv(0.0, 0.0, 0.01 * (i + 1) as f64 + 0.005);
        }
        assert_eq!(rig.gestures.phase(), GesturePhase::Drag);
        assert_eq!(rig.up(0.0, 0.0, 0.5), GestureOutcome::Drag);
        assert!(!rig.events.iter().any(|e| matches!(e, MapEvent::WaypointSelected(_) | MapEvent::WaypointRejected { .. })));
        assert_eq!(rig.events.last(), Some(&MapEvent::ScrollEnded));
    }

    #[test]
    fn drag_back_to_start_is_still_a_drag() {
        let mut rig = Rig::new();
        rig.progression.mark_completed(1).unwrap();
        rig.down(0.0, 0.0, 0.0);
        rig.mv(40.0, 0.0, 0.05);
        rig.mv(0.0, 0.0, 0.1);
        assert_eq!(rig.up(0.0, 0.0, 0.3), GestureOutcome::Drag);
        assert!(!rig.events.contains(&MapEvent::WaypointSelected(2)));
    }

    #[test]
    fn drag_pans_opposite_to_finger() {
        let mut rig = Rig::new();
        let start = rig.viewport.offset();
        rig.down(0.0, 0.0, 0.0);
        rig.mv(3.0, 0.0, 0.01);
        assert_eq!(rig.viewport.offset(), start);
        rig.mv(30.0, 0.0, 0.02);
        assert_eq!(rig.viewport.offset(), start - Vec2::new(30.0, 0.0));
        assert_eq!(rig.events, vec![MapEvent::ScrollChanged(start - Vec2::new(30.0, 0.0))]);
    }

    #[test]
    fn fast_release_glides_and_new_press_stops_it() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, 0.0);
        rig.mv(20.0, 0.0, 0.016);
        rig.mv(40.0, 0.0, 0.032);
        rig.up(40.0, 0.0, 0.04);
        assert!(rig.viewport.is_decelerating());
        assert!(rig.viewport.velocity().x < 0.0);
        rig.down(0.0, 0.0, 1.0);
        assert_eq!(rig.viewport.phase(), ViewportPhase::Idle);
        assert_eq!(rig.viewport.velocity(), Vec2::ZERO);
    }

    #[test]
    fn finger_rested_before_lift_does_not_fling() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, 0.0);
        rig.mv(20.0, 0.0, 0.016);
        rig.mv(40.0, 0.0, 0.032);
        rig.up(40.0, 0.0, 0.8);
        assert_eq!(rig.viewport.phase(), ViewportPhase::Idle);
    }

    #[test]
    fn zero_elapsed_keeps_previous_velocity() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, 0.0);
        rig.mv(20.0, 0.0, 0.02);
        rig.mv(25.0, 0.0, 0.02);
        let s = rig.gestures.session().unwrap();
        assert_eq!(s.instant_velocity, Vec2::new(1000.0, 0.0));
        assert_eq!(s.accumulated_displacement, Vec2::new(25.0, 0.0));
    }

    #[test]
    fn stray_events_are_noops() {
        let mut rig = Rig::new();
        rig.mv(50.0, 50.0, 0.1);
        assert_eq!(rig.up(0.0, 0.0, 0.2), GestureOutcome::Ignored);
        rig.gestures.pointer_cancel(&mut rig.viewport);
        assert!(rig.events.is_empty());
        assert_eq!(rig.gestures.phase(), GesturePhase::None);
    }

    #[test]
    fn cancel_discards_without_tap() {
        let mut rig = Rig::new();
        rig.progression.mark_completed(1).unwrap();
        rig.down(0.0, 0.0, 0.0);
        rig.gestures.pointer_cancel(&mut rig.viewport);
        assert_eq!(rig.up(0.0, 0.0, 0.1), GestureOutcome::Ignored);
        assert!(rig.events.is_empty());

        rig.down(0.0, 0.0, 1.0);
        rig.mv(50.0, 0.0, 1.01);
        let moved = rig.viewport.offset();
        rig.gestures.pointer_cancel(&mut rig.viewport);
        assert_eq!(rig.viewport.offset(), moved);
        assert_eq!(rig.viewport.phase(), ViewportPhase::Idle);
    }

    #[test]
    fn pinch_zooms_and_blocks_tap() {
        let mut rig = Rig::new();
        rig.progression.mark_completed(1).unwrap();
        rig.down(0.0, 0.0, 0.0);
        assert!(rig.gestures.pinch(100.0, 200.0, &mut rig.viewport));
        assert_eq!(rig.viewport.scale(), 2.0);
        assert_eq!(rig.up(0.0, 0.0, 0.1), GestureOutcome::Drag);
        assert!(!rig.events.contains(&MapEvent::WaypointSelected(2)));
        assert!(!rig.gestures.pinch(0.0, 10.0, &mut rig.viewport));
    }

    #[test]
    fn hit_radius_shrinks_in_world_units_when_zoomed_in() {
        let mut rig = Rig::new();
        rig.progression.mark_completed(1).unwrap();
        rig.viewport.set_scale(2.0);
        // 60 view units at scale 2 is 30 world units from rank 2, outside 48 / 2.
        rig.down(60.0, 0.0, 0.0);
        assert_eq!(rig.up(60.0, 0.0, 0.05), GestureOutcome::Tap { rank: None });
        rig.down(40.0, 0.0, 1.0);
        assert_eq!(rig.up(40.0, 0.0, 1.05), GestureOutcome::Tap { rank: Some(2) });
    }
}
