//! OAuth 2.0 device authorization grant client.

pub mod client;
pub mod device_code;
pub mod display;
pub mod error;
pub mod flow;
pub mod token;

pub use client::{DeviceFlowClient, TokenPoller};
pub use device_code::{DeviceAuthorizationSession, DeviceCodePoll, TokenResult};
pub use display::render;
pub use error::AuthError;
pub use flow::{DeviceFlow, DeviceFlowOutcome, FlowState};
pub use token::Token;
