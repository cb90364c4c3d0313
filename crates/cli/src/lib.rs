//! clip-presence command-line frontend

pub mod cmd;
pub mod logging;
pub mod system_config;
