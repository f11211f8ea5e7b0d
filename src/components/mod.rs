pub mod app;
pub mod camera_controls;
pub mod celebration_overlay;
pub mod controls_panel;
pub mod map_view;
pub mod mission_panel;
pub mod settings_modal;
