//! Core process state shared across the pipeline.

mod state;

pub use state::{is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler};
