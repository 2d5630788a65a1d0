//! Message list rendering logic.
//!
//! Handles visual formatting of messages including:
//! - Date separators between messages from different days
//! - Sender grouping (consecutive messages from same sender show name only once)
//! - Media type indicators, delivery ticks, edited markers and reply arrows
//! - Reaction summary lines

use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::ListItem,
};

use crate::domain::{
    message::{Message, Reaction},
    session::Theme,
};

use super::styles;

/// Represents a visual element in the messages list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    /// Date separator line (e.g. "——— Yesterday ———").
    DateSeparator(String),
    /// A message with optional sender display.
    Message {
        time: String,
        sender: Option<String>,
        content: String,
        /// Delivery tick, shown for own messages only.
        tick: Option<&'static str>,
        edited: bool,
        is_reply: bool,
        reactions: String,
    },
}

/// Builds a list of visual elements from messages.
///
/// Groups consecutive messages from the same sender and inserts date
/// separators labelled Today / Yesterday / "Feb 14".
pub fn build_message_list_elements(
    messages: &[Message],
    current_user_id: i64,
) -> Vec<MessageListElement> {
    let today = Local::now().date_naive();
    let mut elements = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for message in messages {
        let msg_date = local_date(message.sent_at);

        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date_label(
                msg_date, today,
            )));
            // Reset sender grouping on date change.
            prev_sender = None;
        }

        let sender_name = effective_sender_name(message, current_user_id);
        let show_sender = prev_sender != Some(sender_name);
        let sender = show_sender.then(|| sender_name.to_owned());

        elements.push(MessageListElement::Message {
            time: format_time(message.sent_at),
            sender,
            content: message.display_content(),
            tick: message
                .is_own(current_user_id)
                .then(|| message.status.tick()),
            edited: message.edited_at.is_some(),
            is_reply: message.reply_to.is_some(),
            reactions: reaction_summary(&message.reactions),
        });

        prev_date = Some(msg_date);
        prev_sender = Some(sender_name);
    }

    elements
}

/// Converts a message index to the corresponding element index in the list.
///
/// Since the element list contains both messages and date separators,
/// this function finds the element index for a given message index.
/// Returns `None` if the message index is out of range.
pub fn message_index_to_element_index(
    elements: &[MessageListElement],
    message_index: usize,
) -> Option<usize> {
    let mut msg_count = 0;

    for (elem_idx, element) in elements.iter().enumerate() {
        if matches!(element, MessageListElement::Message { .. }) {
            if msg_count == message_index {
                return Some(elem_idx);
            }
            msg_count += 1;
        }
    }

    None
}

/// Converts a list element to a ListItem for ratatui rendering.
pub fn element_to_list_item(element: &MessageListElement, theme: Theme) -> ListItem<'static> {
    match element {
        MessageListElement::DateSeparator(label) => date_separator_item(label, theme),
        MessageListElement::Message {
            time,
            sender,
            content,
            tick,
            edited,
            is_reply,
            reactions,
        } => message_item(
            time,
            sender.as_deref(),
            content,
            *tick,
            *edited,
            *is_reply,
            reactions,
            theme,
        ),
    }
}

fn date_separator_item(label: &str, theme: Theme) -> ListItem<'static> {
    let separator = format!("——— {} ———", label);
    let line = Line::from(vec![Span::styled(
        separator,
        styles::date_separator_style(theme),
    )])
    .alignment(Alignment::Center);
    ListItem::new(vec![Line::default(), line, Line::default()])
}

#[allow(clippy::too_many_arguments)]
fn message_item(
    time: &str,
    sender: Option<&str>,
    content: &str,
    tick: Option<&'static str>,
    edited: bool,
    is_reply: bool,
    reactions: &str,
    theme: Theme,
) -> ListItem<'static> {
    let mut lines = Vec::new();
    let indent = "      "; // 6 spaces to align with time column

    let mut spans = vec![Span::styled(
        format!("{:>5} ", time),
        styles::message_time_style(theme),
    )];

    if let Some(name) = sender {
        spans.push(Span::styled(
            format!("{}: ", name),
            styles::message_sender_style(theme),
        ));
    }

    if is_reply {
        spans.push(Span::styled(
            "\u{21aa} ".to_owned(),
            styles::message_meta_style(theme),
        ));
    }

    spans.extend(build_content_spans(content, theme));

    if edited {
        spans.push(Span::styled(
            " (edited)".to_owned(),
            styles::message_meta_style(theme),
        ));
    }

    if let Some(tick) = tick {
        spans.push(Span::styled(
            format!(" {}", tick),
            styles::message_meta_style(theme),
        ));
    }

    lines.push(Line::from(spans));

    if !reactions.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(indent.to_owned()),
            Span::styled(reactions.to_owned(), styles::reaction_style(theme)),
        ]));
    }

    ListItem::new(lines)
}

/// Builds styled spans for the content, highlighting media indicators.
fn build_content_spans(text: &str, theme: Theme) -> Vec<Span<'static>> {
    if text.starts_with('[') {
        if let Some(end_bracket) = text.find(']') {
            let media_part = &text[..=end_bracket];
            let rest = text[end_bracket + 1..].trim_start();

            if rest.is_empty() {
                return vec![Span::styled(
                    media_part.to_owned(),
                    styles::message_media_style(theme),
                )];
            }
            return vec![
                Span::styled(media_part.to_owned(), styles::message_media_style(theme)),
                Span::raw(" ".to_owned()),
                Span::styled(rest.to_owned(), styles::message_text_style(theme)),
            ];
        }
    }

    vec![Span::styled(
        text.to_owned(),
        styles::message_text_style(theme),
    )]
}

/// Aggregates reactions into an emoji-count summary, e.g. "👍 2 ❤️ 1".
/// Emojis appear in first-seen order so the summary is stable.
fn reaction_summary(reactions: &[Reaction]) -> String {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for reaction in reactions {
        match counts.iter_mut().find(|(emoji, _)| *emoji == reaction.emoji) {
            Some((_, count)) => *count += 1,
            None => counts.push((&reaction.emoji, 1)),
        }
    }

    counts
        .iter()
        .map(|(emoji, count)| format!("{} {}", emoji, count))
        .collect::<Vec<_>>()
        .join("  ")
}

fn effective_sender_name(message: &Message, current_user_id: i64) -> &str {
    if message.is_own(current_user_id) {
        "You"
    } else {
        &message.sender_name
    }
}

fn local_date(sent_at: DateTime<Utc>) -> NaiveDate {
    sent_at.with_timezone(&Local).date_naive()
}

fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_owned()
    } else if Some(date) == today.pred_opt() {
        "Yesterday".to_owned()
    } else {
        // Format: "Feb 14"
        date.format("%b %-d").to_string()
    }
}

fn format_time(sent_at: DateTime<Utc>) -> String {
    sent_at.with_timezone(&Local).format("%H:%M").to_string()
}
