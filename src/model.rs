//! Core data models for the campaign map.
//! Content space is y-down with the origin at the centre of the authoring area.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn lerp(self, to: Vec2, t: f64) -> Vec2 {
        self + (to - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// One selectable sector on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// 1-based position in the unlock sequence.
    pub rank: u32,
    pub position: Vec2,
    pub display_name: String,
    /// Number of enemy waves in the sector; shown on the briefing.
    pub waves: u8,
}

/// Axis-aligned box in content space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Never panics: if an axis is inverted, `max` wins.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.max(self.min.x).min(self.max.x), p.y.max(self.min.y).min(self.max.y))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }
}

/// Persisted shape of the player's progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub completed_ranks: Vec<u32>,
    pub highest_unlocked_rank: u32,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            completed_ranks: Vec::new(),
            highest_unlocked_rank: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaypointStatus {
    Locked,
    Unlocked,
    /// The frontier sector the player has yet to clear.
    Current,
    Completed,
}

/// High-level events produced by the map for its consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    WaypointSelected(u32),
    WaypointRejected { rank: u32, required_rank: u32 },
    ScrollChanged(Vec2),
    ScrollEnded,
}

// ---------------- Built-in sector table -----------------
pub const LAYOUT_WIDTH: f64 = 900.0;
pub const LAYOUT_HEIGHT: f64 = 490.0;

pub struct SectorDef {
    pub rank: u32,
    pub name: &'static str,
    /// Placement as a fraction of the layout area, measured from the top-left.
    pub fx: f64,
    pub fy: f64,
}

pub const SECTOR_DEFS: &[SectorDef] = &[
    SectorDef { rank: 1, name: "Alpha Centauri A", fx: 0.10, fy: 0.10 },
    SectorDef { rank: 2, name: "Proxima B Outpost", fx: 0.25, fy: 0.15 },
    SectorDef { rank: 3, name: "Kepler Station", fx: 0.40, fy: 0.10 },
    SectorDef { rank: 4, name: "Tau Ceti Colony", fx: 0.55, fy: 0.15 },
    SectorDef { rank: 5, name: "Pluto Frontier", fx: 0.90, fy: 0.10 },
    SectorDef { rank: 6, name: "Neptune Base", fx: 0.15, fy: 0.35 },
    SectorDef { rank: 7, name: "Uranus Outpost", fx: 0.35, fy: 0.40 },
    SectorDef { rank: 8, name: "Saturn Rings", fx: 0.55, fy: 0.35 },
    SectorDef { rank: 9, name: "Jupiter Station", fx: 0.75, fy: 0.40 },
    SectorDef { rank: 10, name: "Mars Colony", fx: 0.25, fy: 0.65 },
    SectorDef { rank: 11, name: "Moon Base", fx: 0.65, fy: 0.65 },
    SectorDef { rank: 12, name: "Earth Defense", fx: 0.50, fy: 0.85 },
];

pub fn waves_for_rank(rank: u32) -> u8 {
    match rank {
        1..=2 => 3,
        3..=4 => 4,
        _ => 5,
    }
}

/// Waypoints for the built-in campaign, ascending by rank.
pub fn sector_waypoints() -> Vec<Waypoint> {
    let left = -LAYOUT_WIDTH * 0.5;
    let top = -LAYOUT_HEIGHT * 0.5;
    SECTOR_DEFS
        .iter()
        .map(|d| Waypoint {
            rank: d.rank,
            position: Vec2::new(left + LAYOUT_WIDTH * d.fx, top + LAYOUT_HEIGHT * d.fy),
            display_name: d.name.to_string(),
            waves: waves_for_rank(d.rank),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_table_is_contiguous() {
        let wps = sector_waypoints();
        assert_eq!(wps.len(), 12);
        for (i, w) in wps.iter().enumerate() {
            assert_eq!(w.rank, i as u32 + 1);
        }
        assert!(wps[0].position.distance(Vec2::new(-360.0, -196.0)) < 1e-9);
        assert_eq!(wps[11].display_name, "Earth Defense");
    }

    #[test]
    fn wave_counts_step_up() {
        assert_eq!(waves_for_rank(1), 3);
        assert_eq!(waves_for_rank(4), 4);
        assert_eq!(waves_for_rank(12), 5);
    }

    #[test]
    fn bounds_clamp_per_axis() {
        let b = Bounds { min: Vec2::new(-10.0, -5.0), max: Vec2::new(10.0, 5.0) };
        assert_eq!(b.clamp(Vec2::new(50.0, -50.0)), Vec2::new(10.0, -5.0));
        assert!(b.contains(Vec2::ZERO));
        assert!(!b.contains(Vec2::new(0.0, 6.0)));
    }

    #[test]
    fn inverted_bounds_clamp_without_panicking() {
        let b = Bounds { min: Vec2::new(50.0, 0.0), max: Vec2::new(-40.0, 0.0) };
        assert_eq!(b.clamp(Vec2::new(100.0, 3.0)), Vec2::new(-40.0, 0.0));
    }
}
