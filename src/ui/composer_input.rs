//! Composer input field rendering.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{
    composer::{ComposerMode, ComposerState},
    session::Theme,
    shell_state::Focus,
};

use super::styles;

/// Placeholder text shown when the composer is not focused and empty.
const PLACEHOLDER_TEXT: &str = "Type a message, or /file <path> | /voice <path>";

/// Prompt symbol shown before the input text.
const PROMPT_SYMBOL: &str = "> ";

/// Renders the composer input field.
pub fn render_composer(
    frame: &mut Frame<'_>,
    area: Rect,
    composer: &ComposerState,
    focus: Focus,
    theme: Theme,
) {
    let is_focused = focus == Focus::Composer;

    let border_style = if is_focused {
        styles::active_panel_border_style(theme)
    } else {
        styles::inactive_panel_border_style(theme)
    };

    let line = build_input_line(composer, is_focused, theme);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title(composer_title(composer.mode()))
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(paragraph, area);

    if is_focused {
        // Cursor column is the display width of the text before the cursor,
        // not its char count; wide glyphs occupy two cells.
        let before_cursor: String = composer
            .text()
            .chars()
            .take(composer.cursor_position())
            .collect();
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(PROMPT_SYMBOL.len() as u16)
            .saturating_add(before_cursor.width().min(u16::MAX as usize) as u16);
        let cursor_y = area.y.saturating_add(1);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn composer_title(mode: ComposerMode) -> &'static str {
    match mode {
        ComposerMode::Compose => "Compose",
        ComposerMode::Edit { .. } => "Editing (Esc to cancel)",
        ComposerMode::Reply { .. } => "Replying (Esc to cancel)",
    }
}

/// Builds the line content for the input field.
fn build_input_line(composer: &ComposerState, is_focused: bool, theme: Theme) -> Line<'static> {
    let prompt_style = styles::input_prompt_style(theme);

    if !is_focused && composer.is_empty() {
        return Line::from(vec![
            Span::styled(PROMPT_SYMBOL.to_owned(), prompt_style),
            Span::styled(
                PLACEHOLDER_TEXT.to_owned(),
                styles::input_placeholder_style(theme),
            ),
        ]);
    }

    Line::from(vec![
        Span::styled(PROMPT_SYMBOL.to_owned(), prompt_style),
        Span::styled(
            composer.text().to_owned(),
            styles::input_text_style(theme),
        ),
    ])
}
