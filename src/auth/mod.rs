pub mod code_flow;

pub use code_flow::{CodeFlowClient, CodeFlowConfig, CodeFlowError};
