pub mod campaign;
pub mod components;
pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod progression;
pub mod state;
pub mod store;
pub mod util;

pub use config::MapConfig;
pub use error::CampaignError;
pub use map::CampaignMap;
pub use model::{MapEvent, ProgressRecord, Vec2, Waypoint, WaypointStatus};
