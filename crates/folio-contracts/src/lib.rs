pub mod config;
pub mod console;
pub mod events;
pub mod menu;
pub mod projects;
pub mod session;
