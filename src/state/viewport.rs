// Camera state for the campaign map: clamped pan, momentum and focus tweens.
use crate::campaign::CampaignGraph;
use crate::config::MapConfig;
use crate::error::CampaignError;
use crate::model::{Bounds, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportPhase {
    Idle,
    Dragging,
    Decelerating,
    Animating,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FocusTween {
    from: Vec2,
    to: Vec2,
    elapsed: f64,
    duration: f64,
}

/// Which directions the view can still scroll towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeRoom {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

const EDGE_EPS: f64 = 0.5;

#[derive(Clone, Debug)]
pub struct ViewportController {
    /// Content-space point shown at the centre of the view.
    offset: Vec2,
    scale: f64,
    velocity: Vec2,
    phase: ViewportPhase,
    bounds: Bounds,
    tween: Option<FocusTween>,
    tick_accum: f64,
    cfg: MapConfig,
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl ViewportController {
    pub fn new(bounds: Bounds, cfg: &MapConfig) -> Self {
        let cfg = cfg.clone().sanitized();
        Self {
            offset: bounds.center(),
            scale: cfg.default_scale,
            velocity: Vec2::ZERO,
            phase: ViewportPhase::Idle,
            bounds,
            tween: None,
            tick_accum: 0.0,
            cfg,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn phase(&self) -> ViewportPhase {
        self.phase
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_decelerating(&self) -> bool {
        self.phase == ViewportPhase::Decelerating
    }

    pub fn is_animating(&self) -> bool {
        self.phase == ViewportPhase::Animating
    }

    pub fn view_to_world(&self, view: Vec2) -> Vec2 {
        self.offset + view / self.scale
    }

    pub fn world_to_view(&self, world: Vec2) -> Vec2 {
        (world - self.offset) * self.scale
    }

    /// Stops any glide or focus tween. Returns true if something was running.
    pub fn interrupt(&mut self) -> bool {
        let was_moving = matches!(self.phase, ViewportPhase::Decelerating | ViewportPhase::Animating);
        if was_moving {
            tracing::debug!("viewport: {:?} interrupted", self.phase);
        }
        self.velocity = Vec2::ZERO;
        self.tween = None;
        self.tick_accum = 0.0;
        if self.phase != ViewportPhase::Dragging {
            self.phase = ViewportPhase::Idle;
        }
        was_moving
    }

    pub fn begin_drag(&mut self) {
        self.interrupt();
        self.phase = ViewportPhase::Dragging;
    }

    /// Moves the camera by `delta` with a hard per-axis clamp.
    /// Ignored while a focus tween runs. Returns whether the offset changed.
    pub fn pan(&mut self, delta: Vec2) -> bool {
        if self.phase == ViewportPhase::Animating || !delta.is_finite() {
            return false;
        }
        let next = self.bounds.clamp(self.offset + delta);
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// Ends a drag. A fast enough release keeps gliding with `velocity`.
    pub fn release(&mut self, velocity: Vec2) -> ViewportPhase {
        if self.phase != ViewportPhase::Dragging {
            return self.phase;
        }
        if velocity.is_finite() && velocity.length() > self.cfg.momentum_threshold {
            tracing::debug!("viewport: decelerating from {:?}", velocity);
            self.velocity = velocity;
            self.tick_accum = 0.0;
            self.phase = ViewportPhase::Decelerating;
        } else {
            self.velocity = Vec2::ZERO;
            self.phase = ViewportPhase::Idle;
        }
        self.phase
    }

    /// One fixed deceleration step. Returns whether the offset changed.
    pub fn apply_momentum(&mut self) -> bool {
        if self.phase != ViewportPhase::Decelerating {
            return false;
        }
        let target = self.offset + self.velocity * self.cfg.tick_secs;
        let clamped = self.bounds.clamp(target);
        // No bounce: an axis that hits its bound stops dead.
        if clamped.x != target.x {
            self.velocity.x = 0.0;
        }
        if clamped.y != target.y {
            self.velocity.y = 0.0;
        }
        let moved = clamped != self.offset;
        self.offset = clamped;
        self.velocity = self.velocity * self.cfg.decay_rate;
        if self.velocity.length() < self.cfg.stop_speed {
            self.velocity = Vec2::ZERO;
            self.phase = ViewportPhase::Idle;
            tracing::debug!("viewport: deceleration finished at {:?}", self.offset);
        }
        moved
    }

    /// Starts a tween that brings waypoint `rank` to the centre of the view.
    pub fn focus_on(&mut self, campaign: &CampaignGraph, rank: u32) -> Result<(), CampaignError> {
        let target = campaign.position(rank)?;
        self.focus_on_point(target);
        Ok(())
    }

    /// Same as [`focus_on`](Self::focus_on) for an arbitrary point. A finger
    /// on the map wins over the tween, so this does nothing while dragging.
    pub fn focus_on_point(&mut self, target: Vec2) {
        if self.phase == ViewportPhase::Dragging || !target.is_finite() {
            return;
        }
        self.interrupt();
        let to = self.bounds.clamp(target);
        if self.cfg.focus_duration_secs <= 0.0 {
            self.offset = to;
            return;
        }
        self.tween = Some(FocusTween {
            from: self.offset,
            to,
            elapsed: 0.0,
            duration: self.cfg.focus_duration_secs,
        });
        self.phase = ViewportPhase::Animating;
    }

    /// Places the camera on `target` with no tween.
    pub fn jump_to(&mut self, target: Vec2) -> bool {
        if !target.is_finite() {
            return false;
        }
        self.interrupt();
        if self.phase == ViewportPhase::Dragging {
            return false;
        }
        let to = self.bounds.clamp(target);
        let changed = to != self.offset;
        self.offset = to;
        changed
    }

    /// Frame callback. Returns whether the offset changed.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        match self.phase {
            ViewportPhase::Decelerating => {
                self.tick_accum += dt;
                let step = self.cfg.tick_secs;
                let mut steps = 0;
                let mut moved = false;
                while self.tick_accum >= step && self.phase == ViewportPhase::Decelerating {
                    if steps >= self.cfg.max_catchup_ticks {
                        // Long frame: drop the backlog rather than jump.
                        self.tick_accum = 0.0;
                        break;
                    }
                    moved |= self.apply_momentum();
                    self.tick_accum -= step;
                    steps += 1;
                }
                moved
            }
            ViewportPhase::Animating => {
                let Some(mut tw) = self.tween else {
                    self.phase = ViewportPhase::Idle;
                    return false;
                };
                tw.elapsed += dt;
                let t = (tw.elapsed / tw.duration).min(1.0);
                let prev = self.offset;
                self.offset = self.bounds.clamp(tw.from.lerp(tw.to, ease_in_out_cubic(t)));
                if t >= 1.0 {
                    self.offset = tw.to;
                    self.tween = None;
                    self.phase = ViewportPhase::Idle;
                } else {
                    self.tween = Some(tw);
                }
                self.offset != prev
            }
            ViewportPhase::Idle | ViewportPhase::Dragging => false,
        }
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        let next = scale.clamp(self.cfg.min_scale, self.cfg.max_scale);
        let changed = next != self.scale;
        self.scale = next;
        changed
    }

    pub fn zoom_by(&mut self, factor: f64) -> bool {
        self.set_scale(self.scale * factor)
    }

    pub fn edge_room(&self) -> EdgeRoom {
        EdgeRoom {
            left: self.offset.x > self.bounds.min.x + EDGE_EPS,
            right: self.offset.x < self.bounds.max.x - EDGE_EPS,
            up: self.offset.y > self.bounds.min.y + EDGE_EPS,
            down: self.offset.y < self.bounds.max.y - EDGE_EPS,
        }
    }
}
