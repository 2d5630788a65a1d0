//! Style definitions for the UI components, parameterized by theme.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::session::Theme;

fn text_color(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::White,
        Theme::Light => Color::Black,
    }
}

fn dim_color(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::DarkGray,
        Theme::Light => Color::Gray,
    }
}

// =============================================================================
// Panel chrome
// =============================================================================

pub fn active_panel_border_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Cyan)
}

pub fn inactive_panel_border_style(theme: Theme) -> Style {
    Style::default().fg(dim_color(theme))
}

// =============================================================================
// Sidebar styles
// =============================================================================

/// Style for a conversation label.
pub fn sidebar_label_style(theme: Theme) -> Style {
    Style::default().fg(text_color(theme))
}

/// Style for unread count badge (green).
pub fn unread_count_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Green)
}

/// Style for the online presence dot.
pub fn online_indicator_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Green)
}

// =============================================================================
// Message list styles
// =============================================================================

/// Style for message sender name (bold).
pub fn message_sender_style(theme: Theme) -> Style {
    Style::default()
        .fg(text_color(theme))
        .add_modifier(Modifier::BOLD)
}

/// Style for message time in the messages panel.
pub fn message_time_style(theme: Theme) -> Style {
    Style::default().fg(dim_color(theme))
}

/// Style for message text content.
pub fn message_text_style(theme: Theme) -> Style {
    Style::default().fg(text_color(theme))
}

/// Style for media type indicators like [File], [Voice].
pub fn message_media_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Cyan)
}

/// Style for delivery ticks, the edited marker and the reply arrow.
pub fn message_meta_style(theme: Theme) -> Style {
    Style::default().fg(dim_color(theme))
}

/// Style for the reaction summary line.
pub fn reaction_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Yellow)
}

/// Style for date separator line.
pub fn date_separator_style(theme: Theme) -> Style {
    Style::default().fg(dim_color(theme))
}

// =============================================================================
// Composer styles
// =============================================================================

pub fn input_prompt_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Cyan)
}

pub fn input_text_style(theme: Theme) -> Style {
    Style::default().fg(text_color(theme))
}

pub fn input_placeholder_style(theme: Theme) -> Style {
    Style::default().fg(dim_color(theme))
}

// =============================================================================
// Status and notice line styles
// =============================================================================

pub fn typing_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::ITALIC)
}

pub fn notice_info_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Green)
}

pub fn notice_warn_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Yellow)
}

pub fn notice_error_style(theme: Theme) -> Style {
    let _ = theme;
    Style::default().fg(Color::Red)
}
