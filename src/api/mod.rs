// API layer module (adapters for controllers)
// The HTTP surface is an adapter over the agents::Gateway port

pub mod errors;
pub mod handlers;
