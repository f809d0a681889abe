pub mod command;
pub mod persistence;
pub mod player;
pub mod session;
pub mod timeline;
pub mod video;
