//! TUI module using ratatui.
//!
//! Two panes, one per flow. The app only reads flow state snapshots and calls
//! `submit`; results land asynchronously and show up on the next redraw.

pub mod components;

use crate::display;
use crate::flow::{FlowController, Recommend, Summarize};
use base64::Engine as _;
use components::{Pane, View};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::io::Write;
use std::time::{Duration, Instant};

/// How long between redraws when no input arrives
const TICK: Duration = Duration::from_millis(100);

/// How long the "Copied!" marker stays visible
const COPIED_FOR: Duration = Duration::from_secs(2);

/// Run the TUI until the user quits.
///
/// Blocks the calling thread on terminal input. Call it from the runtime's
/// main thread; submitted flows run on the worker threads meanwhile.
pub fn run(
    summarize: FlowController<Summarize>,
    recommend: FlowController<Recommend>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let result = App::new(summarize, recommend).event_loop(&mut terminal);
    ratatui::restore();
    result
}

/// Transient "copied" marker with a deadline.
///
/// Showing it again replaces any pending deadline, so the marker always
/// stays up for the full duration after the latest copy.
#[derive(Debug, Default)]
struct CopiedNotice {
    shown: Option<(Pane, Instant)>,
}

impl CopiedNotice {
    fn show(&mut self, pane: Pane, now: Instant) {
        self.shown = Some((pane, now + COPIED_FOR));
    }

    /// Pane to mark at `now`, clearing the notice once expired
    fn visible(&mut self, now: Instant) -> Option<Pane> {
        match self.shown {
            Some((pane, until)) if now < until => Some(pane),
            Some(_) => {
                self.shown = None;
                None
            }
            None => None,
        }
    }
}

struct App {
    summarize: FlowController<Summarize>,
    recommend: FlowController<Recommend>,
    focus: Pane,
    book_input: String,
    topic_input: String,
    copied: CopiedNotice,
    should_quit: bool,
}

impl App {
    fn new(summarize: FlowController<Summarize>, recommend: FlowController<Recommend>) -> Self {
        Self {
            summarize,
            recommend,
            focus: Pane::Summarize,
            book_input: String::new(),
            topic_input: String::new(),
            copied: CopiedNotice::default(),
            should_quit: false,
        }
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.should_quit {
            let summary = self.summarize.state();
            let recommendations = self.recommend.state();
            let view = View {
                focus: self.focus,
                book_input: &self.book_input,
                topic_input: &self.topic_input,
                summary: &summary,
                recommendations: &recommendations,
                copied: self.copied.visible(Instant::now()),
            };
            terminal.draw(|frame| components::render(frame, &view))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn focused_pending(&self) -> bool {
        match self.focus {
            Pane::Summarize => self.summarize.is_pending(),
            Pane::Recommend => self.recommend.is_pending(),
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Pane::Summarize => &mut self.book_input,
            Pane::Recommend => &mut self.topic_input,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('y') if ctrl => self.copy_result(),
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.toggle(),
            // Input is disabled while the focused flow is in flight
            _ if self.focused_pending() => {}
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.focused_input().pop();
            }
            KeyCode::Char(c) if !ctrl => self.focused_input().push(c),
            _ => {}
        }
    }

    fn submit(&mut self) {
        // Blank input is a silent no-op inside submit
        match self.focus {
            Pane::Summarize => {
                self.summarize.submit(&self.book_input);
            }
            Pane::Recommend => {
                self.recommend.submit(&self.topic_input);
            }
        }
    }

    fn copy_result(&mut self) {
        let Some(text) = self.result_text() else {
            return;
        };
        match copy_to_clipboard(&text) {
            Ok(()) => self.copied.show(self.focus, Instant::now()),
            Err(err) => log::warn!("copy to clipboard failed: {err}"),
        }
    }

    /// Plain text of the focused pane's result, if it has one
    fn result_text(&self) -> Option<String> {
        match self.focus {
            Pane::Summarize => {
                let state = self.summarize.state();
                let summary = state.result.as_ref()?;
                Some(display::summary_text(
                    state.query.as_deref().unwrap_or_default(),
                    summary,
                ))
            }
            Pane::Recommend => {
                let state = self.recommend.state();
                let set = state.result.as_ref()?;
                Some(display::recommendations_text(
                    state.query.as_deref().unwrap_or_default(),
                    set,
                ))
            }
        }
    }
}

/// OSC 52 escape sequence asking the terminal to set the clipboard
fn osc52(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x07")
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(osc52(text).as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, ModelGateway};
    use crate::prompt::{Prompt, RequestMode};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use tokio::sync::Notify;

    const SUMMARY: &str = r#"{"author":"Yuval Noah Harari","summary":"A brief history of humankind.","keyLearnings":[{"learning":"Shared fictions scale cooperation","visual":"*"}]}"#;

    /// Holds every request until released, then answers with `SUMMARY`
    struct HeldGateway {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ModelGateway for HeldGateway {
        async fn invoke(&self, prompt: &Prompt) -> Result<String, GatewayError> {
            self.release.notified().await;
            if prompt.text.contains("books, ") {
                Err(GatewayError::EmptyResponse)
            } else {
                Ok(SUMMARY.to_string())
            }
        }
    }

    fn app() -> (App, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let gateway: Arc<dyn ModelGateway> = Arc::new(HeldGateway {
            release: release.clone(),
        });
        let app = App::new(
            FlowController::new(Summarize::new(RequestMode::Structured), gateway.clone()),
            FlowController::new(Recommend, gateway),
        );
        (app, release)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let summary = app.summarize.state();
        let recommendations = app.recommend.state();
        let view = View {
            focus: app.focus,
            book_input: &app.book_input,
            topic_input: &app.topic_input,
            summary: &summary,
            recommendations: &recommendations,
            copied: app.copied.visible(Instant::now()),
        };
        terminal
            .draw(|frame| components::render(frame, &view))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn typing_and_enter_submit_the_focused_flow() {
        let (mut app, release) = app();
        type_text(&mut app, "Sapiens");
        press(&mut app, KeyCode::Enter);

        assert!(app.summarize.is_pending());
        assert!(!app.recommend.is_pending());
        assert!(screen(&mut app).contains("Analyzing..."));

        // Input is frozen while pending
        type_text(&mut app, "xyz");
        assert_eq!(app.book_input, "Sapiens");

        release.notify_one();
        while app.summarize.is_pending() {
            tokio::task::yield_now().await;
        }
        let screen = screen(&mut app);
        assert!(screen.contains("Yuval Noah Harari"));
        assert!(screen.contains("* Shared fictions scale cooperation"));
    }

    #[tokio::test]
    async fn blank_enter_does_nothing() {
        let (mut app, _release) = app();
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(!app.summarize.is_pending());
    }

    #[tokio::test]
    async fn failed_flow_shows_error_banner() {
        let (mut app, release) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Pane::Recommend);
        type_text(&mut app, "Gardening");
        press(&mut app, KeyCode::Enter);
        assert!(app.recommend.is_pending());
        assert_eq!(app.book_input, "");

        release.notify_one();
        while app.recommend.is_pending() {
            tokio::task::yield_now().await;
        }
        let screen = screen(&mut app);
        assert!(screen.contains("Error: Failed to generate recommendations."));
        assert!(!screen.contains("model returned no text"));
    }

    #[tokio::test]
    async fn backspace_and_quit_keys() {
        let (mut app, _release) = app();
        type_text(&mut app, "Dunee");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.book_input, "Dune");

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.book_input, "Dune");
    }

    #[test]
    fn copied_notice_expires_and_restarts() {
        let start = Instant::now();
        let mut notice = CopiedNotice::default();
        assert_eq!(notice.visible(start), None);

        notice.show(Pane::Summarize, start);
        assert_eq!(notice.visible(start + Duration::from_secs(1)), Some(Pane::Summarize));

        // A second copy replaces the pending deadline
        notice.show(Pane::Recommend, start + Duration::from_millis(1500));
        assert_eq!(
            notice.visible(start + Duration::from_millis(2500)),
            Some(Pane::Recommend)
        );
        assert_eq!(notice.visible(start + Duration::from_secs(4)), None);
        assert!(notice.shown.is_none());
    }

    #[test]
    fn osc52_wraps_base64_payload() {
        assert_eq!(osc52("hi"), "\x1b]52;c;aGk=\x07");
    }
}
