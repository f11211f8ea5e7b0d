//! Static ordered sequence of waypoints and the geometry queries over it.

use crate::error::CampaignError;
use crate::model::{Bounds, Vec2, Waypoint};

#[derive(Clone, Debug, PartialEq)]
pub struct CampaignGraph {
    /// Sorted by rank; `waypoints[i].rank == i + 1`.
    waypoints: Vec<Waypoint>,
    bounds: Bounds,
}

impl CampaignGraph {
    /// Builds the graph from waypoint definitions in any order.
    /// Ranks must form exactly `1..=N`, positions must be finite and the
    /// margin non-negative.
    pub fn new(mut waypoints: Vec<Waypoint>, margin: f64) -> Result<Self, CampaignError> {
        if waypoints.is_empty() {
            return Err(CampaignError::EmptyCampaign);
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(CampaignError::InvalidMargin);
        }
        if let Some(w) = waypoints.iter().find(|w| !w.position.is_finite()) {
            return Err(CampaignError::NonFinitePosition(w.rank));
        }
        waypoints.sort_by_key(|w| w.rank);
        let total = waypoints.len() as u32;
        for (i, w) in waypoints.iter().enumerate() {
            let expected = i as u32 + 1;
            if w.rank == expected {
                continue;
            }
            // Sorted input: a repeat shows up as the previous rank again.
            if i > 0 && waypoints[i - 1].rank == w.rank {
                return Err(CampaignError::DuplicateRank(w.rank));
            }
            return Err(CampaignError::OutOfRange { rank: w.rank, total });
        }
        let mut min = waypoints[0].position;
        let mut max = waypoints[0].position;
        for w in &waypoints[1..] {
            min.x = min.x.min(w.position.x);
            min.y = min.y.min(w.position.y);
            max.x = max.x.max(w.position.x);
            max.y = max.y.max(w.position.y);
        }
        let pad = Vec2::new(margin, margin);
        Ok(Self {
            waypoints,
            bounds: Bounds { min: min - pad, max: max + pad },
        })
    }

    pub fn len(&self) -> u32 {
        self.waypoints.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoint(&self, rank: u32) -> Result<&Waypoint, CampaignError> {
        if rank == 0 || rank > self.len() {
            tracing::error!("waypoint lookup out of range: rank={} total={}", rank, self.len());
            return Err(CampaignError::OutOfRange { rank, total: self.len() });
        }
        Ok(&self.waypoints[(rank - 1) as usize])
    }

    pub fn position(&self, rank: u32) -> Result<Vec2, CampaignError> {
        self.waypoint(rank).map(|w| w.position)
    }

    /// Bounding box of all waypoints, grown by the construction margin.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Closest waypoint within `radius` of `world_point`; equal distances go to the lower rank.
    pub fn hit_test(&self, world_point: Vec2, radius: f64) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for w in &self.waypoints {
            let d = w.position.distance(world_point);
            if d > radius {
                continue;
            }
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((w.rank, d)),
            }
        }
        best.map(|(rank, _)| rank)
    }

    pub fn ordered_positions(&self) -> impl Iterator<Item = (u32, Vec2)> + '_ {
        self.waypoints.iter().map(|w| (w.rank, w.position))
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn previous_rank(&self, rank: u32) -> Option<u32> {
        (rank > 1 && rank <= self.len()).then(|| rank - 1)
    }

    pub fn next_rank(&self, rank: u32) -> Option<u32> {
        (rank >= 1 && rank < self.len()).then(|| rank + 1)
    }
}
