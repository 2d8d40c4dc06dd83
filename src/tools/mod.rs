pub mod health;
pub mod params;

pub use health::{HealthParams, health_summary};
pub use params::*;
