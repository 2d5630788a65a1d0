//! Infrastructure layer: config, logging, storage, and secret hygiene.

pub mod config;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod session;
pub mod storage_layout;
