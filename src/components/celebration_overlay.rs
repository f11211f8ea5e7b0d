use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CelebrationOverlayProps {
    pub show: bool,
    pub sectors: u32,
    pub on_close: Callback<()>,
}

/// Shown once the last sector falls, and again whenever it is tapped afterwards.
#[function_component]
pub fn CelebrationOverlay(props: &CelebrationOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let close_btn = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.88); border:2px solid #3fb950; padding:24px 32px; border-radius:12px; text-align:center; min-width:320px; z-index:40;">
            <h2 style="margin:0 0 12px 0; color:#3fb950;">{"Earth Is Safe!"}</h2>
            <p style="margin:4px 0;">{ format!("All {} sectors defended.", props.sectors) }</p>
            <p style="margin:4px 0; opacity:0.8;">{"Every sector stays open for replay."}</p>
            <div style="margin-top:16px; display:flex; gap:12px; justify-content:center;">
                <button onclick={close_btn}>{"Back to Map"}</button>
            </div>
        </div>
    }
}
