pub mod autopilot;
pub mod constants;
pub mod engine;
pub mod logging;
pub mod maze;
pub mod rng;
pub mod score_store;
pub mod server_protocol;
pub mod types;
