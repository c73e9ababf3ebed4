// lensflow-desk/src/services/mod.rs

//! Implementations of the lifecycle ports for the desk: REST adapters for the
//! retail backend, a file-backed resume store and console output.

pub mod api_client;
pub mod console;
pub mod order_api;
pub mod payment_api;
pub mod session_store;
