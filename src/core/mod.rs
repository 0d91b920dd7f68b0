pub mod assets;
pub mod config;
pub mod events;
pub mod inject;
pub mod input;
pub mod message;
pub mod notify;
pub mod resources;
pub mod state;
pub mod throttle;
pub mod tokens;
pub mod transcript;
