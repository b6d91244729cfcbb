mod choice;
mod engine_config;
mod pilot_choice;
mod statistic_choice;
mod strategy_choice;

pub use choice::Choice;
pub use engine_config::EngineConfig;
pub use pilot_choice::*;
pub use statistic_choice::*;
pub use strategy_choice::*;
