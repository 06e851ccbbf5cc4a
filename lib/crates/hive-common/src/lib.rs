pub mod bus;
pub mod config;
pub mod types;

pub use bus::{BusMessage, WireError};
pub use config::BusEndpoint;
pub use types::AgentStatus;
