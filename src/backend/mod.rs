//! Backend layer: REST, realtime socket, and media process adapters.

pub mod channel;
pub mod fetch;
pub mod media;
pub mod protocol;
pub mod rest;
