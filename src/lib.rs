//! Chat Relay — multi-channel conversational relay in front of a hosted LLM.

pub mod channels;
pub mod config;
pub mod error;
pub mod leads;
pub mod llm;
pub mod relay;
