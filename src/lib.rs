pub mod captive_portal;
pub mod config;
