use super::celebration_overlay::CelebrationOverlay;
use super::map_view::{MapHandle, MapView};
use super::mission_panel::MissionPanel;
use crate::error::CampaignError;
use crate::map::CampaignMap;
use crate::model::sector_waypoints;
use crate::store::{self, UNLOCK_ALL_KEY};
use yew::prelude::*;

#[derive(PartialEq, Clone, Copy)]
enum View {
    Map,
    Briefing(u32),
}

fn build_map() -> Result<MapHandle, CampaignError> {
    CampaignMap::new(store::load_config(), sector_waypoints(), store::open_progress_store()).map(MapHandle::new)
}

#[function_component(App)]
pub fn app() -> Html {
    let map = use_memo((), |_| build_map());
    let view = use_state(|| View::Map);
    // Bumped after any change the map view has to re-read.
    let version = use_state(|| 0u32);
    let show_celebration = use_state(|| false);
    let unlock_all = use_state(|| match &*map {
        Ok(h) => h.0.borrow().config().unlock_all,
        Err(_) => false,
    });

    let handle = match &*map {
        Ok(h) => h.clone(),
        Err(e) => {
            tracing::error!("campaign map failed to load: {}", e);
            return html! {<div style="padding:24px;">{ format!("Campaign data is broken: {}", e) }</div>};
        }
    };

    let bump = {
        let version = version.clone();
        move || version.set(version.wrapping_add(1))
    };

    let on_select = {
        let handle = handle.clone();
        let view = view.clone();
        let show_celebration = show_celebration.clone();
        Callback::from(move |rank: u32| {
            let finale = handle.0.borrow().is_finale(rank);
            if finale {
                show_celebration.set(true);
            } else {
                view.set(View::Briefing(rank));
            }
        })
    };

    let on_victory = {
        let handle = handle.clone();
        let view = view.clone();
        let show_celebration = show_celebration.clone();
        let bump = bump.clone();
        Callback::from(move |rank: u32| {
            let mut m = handle.0.borrow_mut();
            if let Err(e) = m.level_completed(rank) {
                tracing::error!("could not record victory in sector {}: {}", rank, e);
            }
            let finale = m.is_finale(rank);
            drop(m);
            view.set(View::Map);
            if finale {
                show_celebration.set(true);
            }
            bump();
        })
    };

    let on_back = {
        let view = view.clone();
        Callback::from(move |()| view.set(View::Map))
    };

    let on_toggle_unlock_all = {
        let handle = handle.clone();
        let unlock_all = unlock_all.clone();
        let bump = bump.clone();
        Callback::from(move |()| {
            let flag = !*unlock_all;
            handle.0.borrow_mut().set_unlock_all(flag);
            store::write_flag(UNLOCK_ALL_KEY, flag);
            unlock_all.set(flag);
            bump();
        })
    };

    let on_hard_reset = {
        let handle = handle.clone();
        let unlock_all = unlock_all.clone();
        let show_celebration = show_celebration.clone();
        let bump = bump.clone();
        Callback::from(move |()| {
            let mut m = handle.0.borrow_mut();
            m.reset_progress();
            m.set_unlock_all(false);
            drop(m);
            store::write_flag(UNLOCK_ALL_KEY, false);
            unlock_all.set(false);
            show_celebration.set(false);
            bump();
        })
    };

    let close_celebration = {
        let show_celebration = show_celebration.clone();
        Callback::from(move |()| show_celebration.set(false))
    };

    let briefing = match *view {
        View::Map => html! {},
        View::Briefing(rank) => {
            let m = handle.0.borrow();
            let panel = match m.campaign().waypoint(rank) {
                Ok(wp) => html! { <MissionPanel
                    rank={rank}
                    name={wp.display_name.clone()}
                    waves={wp.waves}
                    status={m.waypoint_status(rank)}
                    on_victory={on_victory.clone()}
                    on_back={on_back.clone()}
                /> },
                Err(_) => html! {},
            };
            panel
        }
    };
    let sectors = handle.0.borrow().campaign().len();

    html! {<div style="position:relative; width:100vw; height:100vh; background:#0b0f1a; color:#c9d1d9; font-family:sans-serif;">
        <MapView
            map={handle.clone()}
            version={*version}
            unlock_all={*unlock_all}
            on_select={on_select}
            on_toggle_unlock_all={on_toggle_unlock_all}
            on_hard_reset={on_hard_reset}
        />
        { briefing }
        <CelebrationOverlay show={*show_celebration} sectors={sectors} on_close={close_celebration} />
    </div>}
}
