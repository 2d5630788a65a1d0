use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::domain::{
    chat_state::ChatLoadState,
    contact_list::{ContactListUiState, SidebarEntry},
    conversation::Conversation,
    events::ConnectionStatus,
    notice::{Notice, NoticeLevel},
    session::Theme,
    shell_state::{Focus, ShellState},
};

use super::composer_input::render_composer;
use super::message_rendering::{
    build_message_list_elements, element_to_list_item, message_index_to_element_index,
};
use super::styles;

pub fn render(frame: &mut Frame<'_>, state: &mut ShellState) {
    let [content_area, activity_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    let [sidebar_area, chat_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .areas(content_area);

    // 3 lines for the input: 1 border + 1 text + 1 border.
    let [messages_area, input_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .areas(chat_area);

    let focus = state.focus();
    let theme = state.theme();
    render_sidebar_panel(frame, sidebar_area, state, focus, theme);
    render_messages_panel(frame, messages_area, state, focus, theme);
    render_composer(frame, input_area, &state.composer, focus, theme);

    render_activity_line(frame, activity_area, state, theme);
    let status = Paragraph::new(status_line(state));
    frame.render_widget(status, status_area);
}

fn render_sidebar_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &ShellState,
    focus: Focus,
    theme: Theme,
) {
    let border_style = if focus == Focus::Sidebar {
        styles::active_panel_border_style(theme)
    } else {
        styles::inactive_panel_border_style(theme)
    };

    match state.sidebar.ui_state() {
        ContactListUiState::Loading => {
            render_sidebar_message(frame, area, "Loading contacts...", border_style)
        }
        ContactListUiState::Error => render_sidebar_message(
            frame,
            area,
            "Could not load contacts. Check the connection.",
            border_style,
        ),
        ContactListUiState::Ready => {
            let items: Vec<ListItem<'static>> = state
                .sidebar
                .entries()
                .iter()
                .map(|entry| ListItem::new(sidebar_entry_line(entry, state, theme)))
                .collect();

            let title = format!("Conversations ({})", state.sidebar.entries().len());
            let list = List::new(items)
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(border_style),
                )
                .highlight_style(
                    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
                );

            let mut list_state = ListState::default();
            list_state.select(Some(state.sidebar.selected_index()));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn render_sidebar_message(frame: &mut Frame<'_>, area: Rect, message: &str, border_style: Style) {
    let message = Paragraph::new(message).block(
        Block::default()
            .title("Conversations")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(message, area);
}

fn sidebar_entry_line(entry: &SidebarEntry, state: &ShellState, theme: Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        entry.label.clone(),
        styles::sidebar_label_style(theme),
    )];

    let unread = state.unread.count(entry.conversation);
    if unread > 0 {
        spans.push(Span::styled(
            format!(" [{}]", unread),
            styles::unread_count_style(theme),
        ));
    }

    if let Conversation::Direct(peer) = entry.conversation {
        if state.presence.is_online(peer) {
            spans.push(Span::styled(
                " \u{25CF}".to_owned(),
                styles::online_indicator_style(theme),
            ));
        }
    }

    Line::from(spans)
}

fn render_messages_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &mut ShellState,
    focus: Focus,
    theme: Theme,
) {
    let border_style = if focus == Focus::Messages {
        styles::active_panel_border_style(theme)
    } else {
        styles::inactive_panel_border_style(theme)
    };
    let title = messages_title(state);

    match state.chat.load_state() {
        ChatLoadState::Loading => {
            let panel = Paragraph::new("Loading messages...").block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            frame.render_widget(panel, area);
        }
        ChatLoadState::Error => {
            let panel = Paragraph::new("Could not load messages.").block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            frame.render_widget(panel, area);
        }
        ChatLoadState::Ready => {
            if state.chat.messages().is_empty() {
                let panel = Paragraph::new("No messages yet. Say hello!").block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(border_style),
                );
                frame.render_widget(panel, area);
                return;
            }

            let current_user_id = state.user().id;
            let elements = build_message_list_elements(state.chat.messages(), current_user_id);
            let items: Vec<ListItem<'static>> = elements
                .iter()
                .map(|element| element_to_list_item(element, theme))
                .collect();

            // Viewport height is the area minus the borders.
            let viewport_height = area.height.saturating_sub(2) as usize;

            let element_index = state
                .chat
                .selected_index()
                .and_then(|msg_idx| message_index_to_element_index(&elements, msg_idx));

            if let Some(idx) = element_index {
                state.chat.update_scroll_offset(idx, viewport_height);
            }

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(border_style),
                )
                .highlight_style(
                    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
                );

            let mut list_state = ListState::default();
            list_state.select(element_index);
            *list_state.offset_mut() = state.chat.scroll_offset();
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn messages_title(state: &ShellState) -> String {
    match state.sidebar.label_of(state.active_conversation()) {
        Some(label) => format!("Messages — {}", label),
        None => "Messages".to_owned(),
    }
}

/// One line below the panels: the latest notice wins, otherwise the typing
/// indicator for the active conversation.
fn render_activity_line(frame: &mut Frame<'_>, area: Rect, state: &ShellState, theme: Theme) {
    let line = if let Some(notice) = state.notices.latest() {
        Line::from(Span::styled(notice.text.clone(), notice_style(notice, theme)))
    } else if !state.typing.is_empty() {
        Line::from(Span::styled(
            typing_line(&state.typing.names()),
            styles::typing_style(theme),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn notice_style(notice: &Notice, theme: Theme) -> Style {
    match notice.level {
        NoticeLevel::Info => styles::notice_info_style(theme),
        NoticeLevel::Warn => styles::notice_warn_style(theme),
        NoticeLevel::Error => styles::notice_error_style(theme),
    }
}

fn typing_line(names: &[&str]) -> String {
    if names.len() == 1 {
        format!("{} is typing...", names[0])
    } else {
        format!("{} are typing...", names.join(", "))
    }
}

fn status_line(state: &ShellState) -> String {
    let connection = match state.connection() {
        ConnectionStatus::Connected => match state.presence.online_count() {
            0 => "online".to_owned(),
            n => format!("online ({n} active)"),
        },
        other => connection_label(other).to_owned(),
    };
    let nav_hint = match state.focus() {
        Focus::Sidebar => "j/k: navigate | Enter: open | Tab: pane | Ctrl+T: theme | Ctrl+Q: quit",
        Focus::Messages => {
            "j/k: navigate | e: edit | d: delete | r: reply | 1-4: react | o: open | p: play | s: stop"
        }
        Focus::Composer => "Enter: send | Esc: cancel | Tab: pane | Ctrl+T: theme | Ctrl+Q: quit",
    };
    format!("{connection} | {nav_hint}")
}

fn connection_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connecting => "connecting...",
        ConnectionStatus::Connected => "online",
        ConnectionStatus::Disconnected => "reconnecting...",
        ConnectionStatus::Error => "offline",
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::domain::session::User;

    fn state() -> ShellState {
        ShellState::new(
            User {
                id: 1,
                username: "me".to_owned(),
                email: "me@example.com".to_owned(),
            },
            Theme::Dark,
            Duration::from_secs(4),
            Duration::from_secs(2),
        )
    }

    fn contact(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
        }
    }

    /// Extracts text content from a Line for testing.
    fn line_to_string(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn status_line_labels_the_connection() {
        let mut state = state();

        state.set_connection(ConnectionStatus::Connected);
        assert!(status_line(&state).starts_with("online"));

        state.set_connection(ConnectionStatus::Disconnected);
        assert!(status_line(&state).starts_with("reconnecting..."));
    }

    #[test]
    fn status_line_counts_active_contacts_when_connected() {
        let mut state = state();
        state.set_connection(ConnectionStatus::Connected);
        state.presence.apply_status(7, true);
        state.presence.apply_status(8, true);

        assert!(status_line(&state).starts_with("online (2 active)"));
    }

    #[test]
    fn status_line_hints_follow_the_focused_pane() {
        let mut state = state();

        assert!(status_line(&state).contains("Enter: send"));

        state.cycle_focus(); // sidebar
        assert!(status_line(&state).contains("Enter: open"));

        state.cycle_focus(); // messages
        assert!(status_line(&state).contains("1-4: react"));
    }

    #[test]
    fn sidebar_entry_shows_unread_badge() {
        let mut state = state();
        state.sidebar.set_ready(vec![contact(7, "ana")]);
        state.unread.record(Conversation::Direct(7));
        state.unread.record(Conversation::Direct(7));

        let line = sidebar_entry_line(&state.sidebar.entries()[1].clone(), &state, Theme::Dark);
        let text = line_to_string(&line);

        assert!(text.contains("ana"));
        assert!(text.contains("[2]"));
    }

    #[test]
    fn sidebar_entry_omits_badge_when_read() {
        let mut state = state();
        state.sidebar.set_ready(vec![contact(7, "ana")]);

        let line = sidebar_entry_line(&state.sidebar.entries()[1].clone(), &state, Theme::Dark);
        let text = line_to_string(&line);

        assert!(!text.contains('['));
    }

    #[test]
    fn sidebar_entry_shows_online_dot_for_present_contacts() {
        let mut state = state();
        state.sidebar.set_ready(vec![contact(7, "ana")]);
        state.presence.apply_status(7, true);

        let line = sidebar_entry_line(&state.sidebar.entries()[1].clone(), &state, Theme::Dark);

        assert!(line_to_string(&line).contains('\u{25CF}'));
    }

    #[test]
    fn broadcast_never_gets_an_online_dot() {
        let mut state = state();
        state.sidebar.set_ready(vec![contact(7, "ana")]);
        state.presence.apply_status(7, true);

        let line = sidebar_entry_line(&state.sidebar.entries()[0].clone(), &state, Theme::Dark);

        assert!(!line_to_string(&line).contains('\u{25CF}'));
    }

    #[test]
    fn messages_title_names_the_active_conversation() {
        let mut state = state();
        state.sidebar.set_ready(vec![contact(7, "ana")]);

        assert_eq!(messages_title(&state), "Messages — general");

        state.set_active_conversation(Conversation::Direct(7));
        assert_eq!(messages_title(&state), "Messages — ana");
    }

    #[test]
    fn typing_line_pluralizes() {
        assert_eq!(typing_line(&["ana"]), "ana is typing...");
        assert_eq!(typing_line(&["ana", "bo"]), "ana, bo are typing...");
    }

    #[test]
    fn notices_pick_a_style_per_level() {
        let mut state = state();
        state
            .notices
            .post(NoticeLevel::Error, "boom", Instant::now());

        let notice = state.notices.latest().expect("notice");

        assert_eq!(
            notice_style(notice, Theme::Dark),
            styles::notice_error_style(Theme::Dark)
        );
    }
}
