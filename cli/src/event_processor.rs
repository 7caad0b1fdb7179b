use std::fmt::Display;
use std::io::Write;

use electron_inject_core::InjectionEvent;
use electron_inject_core::InjectionReporter;
use owo_colors::OwoColorize;
use owo_colors::Style;

/// Renders scheduler events for a person watching the terminal.
pub(crate) struct EventProcessorWithHumanOutput<W: Write + Send> {
    out: W,
    with_ansi: bool,
}

impl<W: Write + Send> EventProcessorWithHumanOutput<W> {
    pub(crate) fn new(out: W, with_ansi: bool) -> Self {
        Self { out, with_ansi }
    }

    fn paint(&self, text: impl Display, style: Style) -> String {
        if self.with_ansi {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

impl<W: Write + Send> InjectionReporter for EventProcessorWithHumanOutput<W> {
    fn report(&mut self, event: &InjectionEvent) {
        let bold = Style::new().bold();
        let dimmed = Style::new().dimmed();
        let line = match event {
            InjectionEvent::PollStarted { .. } | InjectionEvent::WindowCompleted { .. } => return,
            InjectionEvent::PollFailed { poll, error } => {
                format!("{} {error}", self.paint(format!("poll {poll} failed:"), dimmed))
            }
            InjectionEvent::WindowDiscovered { target, .. } => format!(
                "{} {} {}",
                self.paint("window", bold),
                self.paint(&target.id, bold),
                self.paint(format!("({} {})", target.title, target.url), dimmed)
            ),
            InjectionEvent::ScriptSucceeded { script, result, .. } => format!(
                "  {} {script}: {}",
                self.paint("ok", Style::new().green()),
                truncate(&result.summary(), 120)
            ),
            InjectionEvent::ScriptFailed { script, error, .. } => {
                format!("  {} {script}: {error}", self.paint("failed", Style::new().red()))
            }
            InjectionEvent::RunCompleted { summary, .. } => format!(
                "{} {} window(s) injected, {} script(s) ok, {} failed, {} poll(s)",
                self.paint("done:", bold),
                summary.windows_injected,
                summary.scripts_succeeded,
                summary.scripts_failed,
                summary.polls
            ),
        };
        let _ = writeln!(self.out, "{line}");
    }
}

/// One JSON object per event, one event per line.
pub(crate) struct EventProcessorWithJsonOutput<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> EventProcessorWithJsonOutput<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> InjectionReporter for EventProcessorWithJsonOutput<W> {
    fn report(&mut self, event: &InjectionEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(self.out, "{line}");
            let _ = self.out.flush();
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
