//! UI components for the TUI.
//!
//! Components are stateless: they draw a [`View`] snapshot assembled by the app.

use crate::flow::{FlowState, FlowStatus};
use crate::model::{RecommendationSet, SummaryResult};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;

/// Which pane has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Summarize,
    Recommend,
}

impl Pane {
    pub fn toggle(self) -> Self {
        match self {
            Pane::Summarize => Pane::Recommend,
            Pane::Recommend => Pane::Summarize,
        }
    }
}

/// Everything needed to draw one frame
pub struct View<'a> {
    pub focus: Pane,
    pub book_input: &'a str,
    pub topic_input: &'a str,
    pub summary: &'a FlowState<SummaryResult>,
    pub recommendations: &'a FlowState<RecommendationSet>,
    /// Pane whose result was just copied
    pub copied: Option<Pane>,
}

pub fn render(frame: &mut Frame, view: &View) {
    let errors: Vec<&str> = [
        view.summary.error_message.as_deref(),
        view.recommendations.error_message.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let banner_height = if errors.is_empty() {
        0
    } else {
        errors.len() as u16 + 2
    };

    let [header, banner, body] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(banner_height),
        Constraint::Min(0),
    ])
    .areas(frame.area());
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);

    render_header(frame, header);
    if !errors.is_empty() {
        render_error_banner(frame, banner, &errors);
    }

    let summary_pane = PaneView {
        title: "1. Summarize a Book",
        input: view.book_input,
        placeholder: "Enter a book title (e.g., 'Sapiens: A Brief History of Humankind')",
        pending_label: "Analyzing...",
        focused: view.focus == Pane::Summarize,
        status: view.summary.status,
        copied: view.copied == Some(Pane::Summarize),
    };
    let result = summary_lines(view.summary);
    render_pane(frame, left, &summary_pane, result);

    let recommend_pane = PaneView {
        title: "2. Discover Your Next Step",
        input: view.topic_input,
        placeholder: "Enter a subject you're interested in (e.g., 'Quantum Physics')",
        pending_label: "Searching...",
        focused: view.focus == Pane::Recommend,
        status: view.recommendations.status,
        copied: view.copied == Some(Pane::Recommend),
    };
    let result = recommendation_lines(view.recommendations);
    render_pane(frame, right, &recommend_pane, result);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Text::from(vec![
        Line::from("BookWise AI".bold().cyan()),
        Line::from(
            "Tab: switch  Enter: submit  Ctrl+Y: copy result  Esc: quit".dark_gray(),
        ),
    ]);
    frame.render_widget(Paragraph::new(header).centered(), area);
}

fn render_error_banner(frame: &mut Frame, area: Rect, errors: &[&str]) {
    let lines: Vec<Line> = errors
        .iter()
        .map(|message| Line::from(vec!["Error: ".bold(), Span::raw(*message)]))
        .collect();
    let banner = Paragraph::new(lines)
        .style(Style::default().fg(Color::Red))
        .block(Block::bordered().border_style(Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}

struct PaneView<'a> {
    title: &'a str,
    input: &'a str,
    placeholder: &'a str,
    pending_label: &'a str,
    focused: bool,
    status: FlowStatus,
    copied: bool,
}

fn render_pane(frame: &mut Frame, area: Rect, pane: &PaneView, result: Vec<Line<'_>>) {
    let [input_area, result_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let pending = pane.status == FlowStatus::Pending;
    let border = if pane.focused && !pending {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_text = if pane.input.is_empty() {
        Line::from(pane.placeholder.dark_gray())
    } else {
        Line::from(pane.input)
    };
    let mut input_block = Block::bordered().title(pane.title).border_style(border);
    if pending {
        input_block = input_block.title(Line::from(pane.pending_label.yellow()).right_aligned());
    }
    frame.render_widget(Paragraph::new(input_text).block(input_block), input_area);

    if pane.focused && !pending {
        let x = (input_area.x + 1 + cursor_column(pane.input))
            .min(input_area.right().saturating_sub(2));
        frame.set_cursor_position((x, input_area.y + 1));
    }

    let mut result_block = Block::bordered().border_style(Style::default().fg(Color::DarkGray));
    if pane.copied {
        result_block = result_block.title(Line::from("Copied!".green()).right_aligned());
    }
    let body = if pending {
        vec![Line::from(pane.pending_label.yellow())]
    } else {
        result
    };
    frame.render_widget(
        Paragraph::new(body).block(result_block).wrap(Wrap { trim: false }),
        result_area,
    );
}

/// Display width of the typed input, counting wide glyphs as two cells
fn cursor_column(input: &str) -> u16 {
    u16::try_from(Line::from(input).width()).unwrap_or(u16::MAX)
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

/// Summary view: title, author, summary paragraph, then the learnings
pub fn summary_lines(state: &FlowState<SummaryResult>) -> Vec<Line<'_>> {
    let Some(summary) = &state.result else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    if let Some(title) = &state.query {
        lines.push(heading(title));
    }
    lines.push(Line::from(vec![
        "by ".dark_gray(),
        Span::raw(summary.author.as_str()).italic(),
    ]));
    lines.push(Line::default());
    lines.push(Line::from("Summary".bold()));
    lines.push(Line::from(summary.summary.as_str()));
    lines.push(Line::default());
    lines.push(Line::from("Key Learnings".bold()));
    for item in &summary.key_learnings {
        lines.push(Line::from(format!("{} {}", item.visual, item.learning)));
    }
    lines
}

/// Recommendation view: one labelled list per category
pub fn recommendation_lines(state: &FlowState<RecommendationSet>) -> Vec<Line<'_>> {
    let Some(set) = &state.result else {
        return Vec::new();
    };
    if set.is_empty() {
        return vec![Line::from("No recommendations returned.".dark_gray())];
    }
    let mut lines = Vec::new();
    for (label, items) in set.categories() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(heading(label));
        for item in items {
            lines.push(Line::from(vec!["• ".into(), item.title.as_str().bold()]));
            lines.push(Line::from(vec![
                "  ".into(),
                item.description.as_str().dark_gray(),
            ]));
        }
    }
    lines
}
