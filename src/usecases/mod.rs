//! Use case layer: application workflows and orchestration.

pub mod auth;
pub mod contracts;
pub mod logout;
pub mod message_actions;
pub mod playback;
pub mod send_message;
pub mod shell;
pub mod startup;
pub mod switch_conversation;
pub mod upload;
