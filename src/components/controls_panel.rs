use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub cleared: u32,
    pub total: u32,
    pub frontier_name: String,
    pub unlock_all: bool,
    /// Transient message, e.g. why a sector could not be opened.
    pub toast: Option<String>,
    pub on_open_settings: Callback<()>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let settings_cb = {
        let cb = props.on_open_settings.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:200px; display:flex; flex-direction:column; gap:6px;">
        <div style="font-size:14px; font-weight:600;">{ format!("Sectors cleared: {}/{}", props.cleared, props.total) }</div>
        <div style="font-size:12px; opacity:0.8;">{ format!("Next: {}", props.frontier_name) }</div>
        { if props.unlock_all { html!{ <div style="font-size:11px; color:#d29922;">{"All sectors unlocked (testing)"}</div> } } else { html!{} } }
        <button onclick={settings_cb}>{"Settings"}</button>
        <div style="font-size:11px; opacity:0.7;">{"Drag to scroll, tap a sector to open it"}</div>
        { if let Some(txt) = &props.toast { html!{ <div style="font-size:12px; line-height:1.2; color:#f85149; background:#1c2128; border:1px solid #30363d; padding:4px 6px; border-radius:6px;">{ txt.clone() }</div> } } else { html!{} } }
    </div>}
}
