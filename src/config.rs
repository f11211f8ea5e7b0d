//! Tuning constants for gestures, camera motion and progression.
//! Every field has a default so partial JSON overrides are accepted.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Cumulative absolute movement (per axis) after which a press becomes a drag.
    pub drag_threshold: f64,
    /// Release speed (units/sec) above which a drag keeps gliding.
    pub momentum_threshold: f64,
    /// Velocity multiplier applied once per fixed tick while decelerating.
    pub decay_rate: f64,
    /// Speed (units/sec) under which deceleration stops.
    pub stop_speed: f64,
    /// Fixed step used for deceleration, in seconds.
    pub tick_secs: f64,
    pub max_catchup_ticks: u32,
    /// A move sample older than this at release contributes no fling velocity.
    pub velocity_stale_secs: f64,
    pub focus_duration_secs: f64,
    /// Padding around the outermost waypoints that the camera may still reach.
    pub content_margin: f64,
    pub hit_radius: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default_scale: f64,
    /// Debug override: every sector is selectable regardless of progress.
    pub unlock_all: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            momentum_threshold: 10.0,
            decay_rate: 0.95,
            stop_speed: 5.0,
            tick_secs: 1.0 / 60.0,
            max_catchup_ticks: 8,
            velocity_stale_secs: 0.1,
            focus_duration_secs: 0.5,
            content_margin: 150.0,
            hit_radius: 48.0,
            min_scale: 0.5,
            max_scale: 3.0,
            default_scale: 1.0,
            unlock_all: false,
        }
    }
}

impl MapConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<MapConfig>(raw).map(MapConfig::sanitized)
    }

    /// Replaces values that would break the controllers with their defaults.
    pub fn sanitized(self) -> Self {
        let d = MapConfig::default();
        let non_neg = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let mut out = Self {
            drag_threshold: non_neg(self.drag_threshold, d.drag_threshold),
            momentum_threshold: non_neg(self.momentum_threshold, d.momentum_threshold),
            decay_rate: if self.decay_rate.is_finite() && self.decay_rate > 0.0 && self.decay_rate < 1.0 {
                self.decay_rate
            } else {
                d.decay_rate
            },
            stop_speed: positive(self.stop_speed, d.stop_speed),
            tick_secs: positive(self.tick_secs, d.tick_secs),
            max_catchup_ticks: self.max_catchup_ticks.max(1),
            velocity_stale_secs: positive(self.velocity_stale_secs, d.velocity_stale_secs),
            focus_duration_secs: non_neg(self.focus_duration_secs, d.focus_duration_secs),
            content_margin: non_neg(self.content_margin, d.content_margin),
            hit_radius: non_neg(self.hit_radius, d.hit_radius),
            min_scale: positive(self.min_scale, d.min_scale),
            max_scale: positive(self.max_scale, d.max_scale),
            default_scale: positive(self.default_scale, d.default_scale),
            unlock_all: self.unlock_all,
        };
        if out.min_scale > out.max_scale {
            out.min_scale = d.min_scale;
            out.max_scale = d.max_scale;
        }
        out.default_scale = out.default_scale.clamp(out.min_scale, out.max_scale);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = MapConfig::from_json(r#"{"drag_threshold": 8.0, "unlock_all": true}"#).unwrap();
        assert_eq!(cfg.drag_threshold, 8.0);
        assert!(cfg.unlock_all);
        assert_eq!(cfg.decay_rate, 0.95);
        assert_eq!(cfg.hit_radius, 48.0);
    }

    #[test]
    fn sanitize_repairs_bad_values() {
        let cfg = MapConfig {
            decay_rate: 1.5,
            stop_speed: 0.0,
            tick_secs: f64::NAN,
            min_scale: 4.0,
            max_scale: 2.0,
            max_catchup_ticks: 0,
            ..MapConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.decay_rate, 0.95);
        assert_eq!(cfg.stop_speed, 5.0);
        assert!((cfg.tick_secs - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!((cfg.min_scale, cfg.max_scale), (0.5, 3.0));
        assert_eq!(cfg.max_catchup_ticks, 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MapConfig::from_json("{not json").is_err());
    }
}
