use campaign_map::components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    campaign_map::util::init_logging(campaign_map::store::log_level_setting());
    yew::Renderer::<App>::new().render();
}
