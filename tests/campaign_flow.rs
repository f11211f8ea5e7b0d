//! End-to-end flows through the composed map: taps, completions, persistence.
use campaign_map::model::sector_waypoints;
use campaign_map::progression::MemoryStore;
use campaign_map::{CampaignError, CampaignMap, MapConfig, MapEvent, ProgressRecord, Vec2, WaypointStatus};

fn open(store: &MemoryStore) -> CampaignMap {
    CampaignMap::new(MapConfig::default(), sector_waypoints(), Box::new(store.clone())).unwrap()
}

/// Taps the waypoint's on-screen position, wherever the camera currently is.
fn tap(map: &mut CampaignMap, rank: u32, t: f64) -> Vec<MapEvent> {
    let world = map.campaign().position(rank).unwrap();
    let view = map.viewport().world_to_view(world);
    let mut events = map.pointer_down(view, t);
    events.extend(map.pointer_up(view + Vec2::new(1.0, -1.0), t + 0.08));
    events
}

#[test]
fn fresh_player_walks_the_first_sectors() {
    let store = MemoryStore::default();
    let mut map = open(&store);
    assert!(map.progression().is_fresh());

    assert_eq!(tap(&mut map, 1, 0.0), vec![MapEvent::WaypointSelected(1)]);
    map.level_completed(1).unwrap();
    assert_eq!(map.progression().highest_unlocked_rank(), 2);

    assert_eq!(tap(&mut map, 2, 1.0), vec![MapEvent::WaypointSelected(2)]);
    assert_eq!(
        tap(&mut map, 5, 2.0),
        vec![MapEvent::WaypointRejected { rank: 5, required_rank: 2 }]
    );
    let msg = CampaignError::Locked { rank: 5, required: 2 }.player_message();
    assert_eq!(msg.as_deref(), Some("Complete Sector 2 first!"));
}

#[test]
fn progress_survives_reopening() {
    let store = MemoryStore::default();
    {
        let mut map = open(&store);
        map.level_completed(1).unwrap();
        map.level_completed(2).unwrap();
        map.level_completed(2).unwrap();
    }
    assert_eq!(
        store.record(),
        Some(ProgressRecord { completed_ranks: vec![1, 2], highest_unlocked_rank: 3 })
    );
    let map = open(&store);
    assert_eq!(map.waypoint_status(2), WaypointStatus::Completed);
    assert_eq!(map.waypoint_status(3), WaypointStatus::Current);
    assert_eq!(map.viewport().offset(), map.campaign().position(3).unwrap());
}

#[test]
fn out_of_order_completion_keeps_frontier() {
    let store = MemoryStore::default();
    let mut map = open(&store);
    map.level_completed(1).unwrap();
    map.level_completed(3).unwrap();
    assert_eq!(map.progression().highest_unlocked_rank(), 2);
    assert_eq!(map.waypoint_status(3), WaypointStatus::Completed);
    assert_eq!(tap(&mut map, 4, 0.0), vec![MapEvent::WaypointRejected { rank: 4, required_rank: 2 }]);
}

#[test]
fn corrupt_record_is_repaired_on_load() {
    let store = MemoryStore::with_record(ProgressRecord { completed_ranks: vec![0, 2, 40], highest_unlocked_rank: 99 });
    let map = open(&store);
    assert_eq!(map.progression().highest_unlocked_rank(), 12);
    assert_eq!(map.progression().completed_ranks().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn finished_campaign_still_selects_final_sector() {
    let store = MemoryStore::with_record(ProgressRecord { completed_ranks: (1..=11).collect(), highest_unlocked_rank: 12 });
    let mut map = open(&store);
    map.level_completed(12).unwrap();
    assert!(map.progression().is_campaign_complete());
    assert_eq!(map.progression().highest_unlocked_rank(), 12);
    for _ in 0..60 {
        map.tick(1.0 / 60.0);
    }
    assert_eq!(tap(&mut map, 12, 5.0), vec![MapEvent::WaypointSelected(12)]);
}

#[test]
fn unlock_all_config_opens_everything_from_the_start() {
    let cfg = MapConfig { unlock_all: true, ..MapConfig::default() };
    let mut map = CampaignMap::new(cfg, sector_waypoints(), Box::new(MemoryStore::default())).unwrap();
    assert_eq!(tap(&mut map, 7, 0.0), vec![MapEvent::WaypointSelected(7)]);
    // The override never advances real progress.
    assert_eq!(map.progression().highest_unlocked_rank(), 1);
}
