pub mod time_display;
