pub mod distribution;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod orchestrator;

#[cfg(test)]
pub mod testing;

pub use error::FlowError;
pub use flow::{FlowStep, MemoryFlowStateStore, TaskList};
pub use gateway::{FormGateway, FormHandle, FormView, GatewayError};
pub use orchestrator::StandupOrchestrator;
