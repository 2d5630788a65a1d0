//! Event source for the shell loop: merges backend worker events with
//! terminal input. Worker events are drained first so server pushes are
//! never starved by a chatty keyboard.

use std::{sync::mpsc::Receiver, time::Duration};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::{
    domain::events::{AppEvent, Key, KeyInput},
    usecases::contracts::AppEventSource,
};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub struct CrosstermEventSource {
    worker_events: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new(worker_events: Receiver<AppEvent>) -> Self {
        Self { worker_events }
    }
}

impl AppEventSource for CrosstermEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if let Ok(event) = self.worker_events.try_recv() {
            return Ok(Some(event));
        }

        if !event::poll(EVENT_POLL_TIMEOUT)? {
            return Ok(Some(AppEvent::Tick));
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(None);
            }

            if let Some(mapped) = map_key_code(key.code) {
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                return Ok(Some(AppEvent::Input(KeyInput { key: mapped, ctrl })));
            }
        }

        Ok(None)
    }
}

fn map_key_code(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

#[cfg(test)]
pub struct MockEventSource {
    queue: std::collections::VecDeque<AppEvent>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn from(events: Vec<AppEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }
}

#[cfg(test)]
impl AppEventSource for MockEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(self.queue.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::domain::events::ConnectionStatus;

    #[test]
    fn worker_events_are_drained_before_terminal_polling() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Connection(ConnectionStatus::Connected))
            .expect("send");
        let mut source = CrosstermEventSource::new(rx);

        let event = source.next_event().expect("event");

        assert_eq!(
            event,
            Some(AppEvent::Connection(ConnectionStatus::Connected))
        );
    }

    #[test]
    fn key_codes_map_onto_the_domain_vocabulary() {
        assert_eq!(map_key_code(KeyCode::Char('x')), Some(Key::Char('x')));
        assert_eq!(map_key_code(KeyCode::Enter), Some(Key::Enter));
        assert_eq!(map_key_code(KeyCode::Tab), Some(Key::Tab));
        assert_eq!(map_key_code(KeyCode::Esc), Some(Key::Esc));
        assert_eq!(map_key_code(KeyCode::F(1)), None);
    }
}
