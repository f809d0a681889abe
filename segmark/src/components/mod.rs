pub mod position_bar;
pub mod stats_panel;
pub mod timeline_bar;
