//! UI layer: terminal rendering and input.

mod composer_input;
mod event_source;
mod message_rendering;
pub mod shell;
mod styles;
mod terminal;
mod view;

pub use event_source::CrosstermEventSource;
