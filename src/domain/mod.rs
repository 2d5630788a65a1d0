//! Domain layer: pure client state and the reconciliation rules that keep
//! the visible message list consistent with the server.

pub mod chat_state;
pub mod composer;
pub mod contact_list;
pub mod conversation;
pub mod events;
pub mod message;
pub mod notice;
pub mod presence;
pub mod session;
pub mod shell_state;
