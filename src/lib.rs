pub mod config;
pub mod cooldown;
pub mod logging;
pub mod proxy;
