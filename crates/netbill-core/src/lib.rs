pub mod config;
pub mod error;
pub mod finance;
pub mod projection;
pub mod simulate;
pub mod time_value;
pub mod types;

pub use config::ConfigStore;
pub use error::NetbillError;
pub use simulate::{simulate, SimulationRequest, SimulationResult};
pub use types::*;

/// Standard result type for all netbill operations
pub type NetbillResult<T> = Result<T, NetbillError>;
