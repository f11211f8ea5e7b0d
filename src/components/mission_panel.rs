use crate::model::WaypointStatus;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct MissionPanelProps {
    pub rank: u32,
    pub name: String,
    pub waves: u8,
    pub status: WaypointStatus,
    pub on_victory: Callback<u32>,
    pub on_back: Callback<()>,
}

/// Briefing for a selected sector. Gameplay itself lives elsewhere; the
/// "Report Victory" button stands in for its completion callback.
#[function_component(MissionPanel)]
pub fn mission_panel(props: &MissionPanelProps) -> Html {
    let victory_btn = {
        let cb = props.on_victory.clone();
        let rank = props.rank;
        Callback::from(move |_| cb.emit(rank))
    };
    let back_btn = {
        let cb = props.on_back.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let status_line = match props.status {
        WaypointStatus::Completed => "Cleared. Replaying keeps your progress.",
        WaypointStatus::Current => "Frontier sector. Win to unlock the next one.",
        WaypointStatus::Unlocked => "Open for play.",
        WaypointStatus::Locked => "Locked.",
    };
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.87); border:2px solid #30363d; padding:28px 36px; border-radius:14px; max-width:520px; width:90%; box-shadow:0 0 0 1px #1a1f24, 0 6px 18px rgba(0,0,0,0.6); font-size:14px; line-height:1.4;">
            <h2 style="margin:0 0 4px 0; font-size:22px; color:#58a6ff; text-align:center;">{ format!("Sector {}", props.rank) }</h2>
            <p style="margin:0 0 10px 0; text-align:center; font-size:18px;">{ props.name.clone() }</p>
            <ul style="margin:0 0 12px 18px; padding:0; list-style:disc; display:flex; flex-direction:column; gap:4px;">
                <li>{ format!("Enemy waves: {}", props.waves) }</li>
                <li>{ status_line }</li>
            </ul>
            <div style="display:flex; gap:12px; justify-content:center; margin-top:8px;">
                <button onclick={victory_btn}>{"Report Victory"}</button>
                <button onclick={back_btn}>{"Back"}</button>
            </div>
        </div>
    }
}
