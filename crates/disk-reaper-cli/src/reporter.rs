use colored::*;
use crossbeam_channel::Receiver;
use disk_reaper_core::{EventKind, ReaperEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Renders sweep events on the terminal.
///
/// - Status and countdown: the message of a single spinner line
/// - Log: timestamped lines printed above the spinner
pub struct EventReporter {
    bar: ProgressBar,
}

impl EventReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Consume events on a background thread until every sender is gone.
    pub fn spawn(self, rx: Receiver<ReaperEvent>) -> JoinHandle<()> {
        thread::spawn(move || {
            for event in rx.iter() {
                self.handle(&event);
            }
            self.bar.finish_and_clear();
        })
    }

    fn handle(&self, event: &ReaperEvent) {
        match event.kind {
            EventKind::Status => self.bar.set_message(format_status(&event.text)),
            EventKind::Countdown => self.bar.set_message(event.text.yellow().to_string()),
            EventKind::Log => self.bar.println(format!(
                "{} {}",
                event.at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                event.text
            )),
        }
    }
}

fn format_status(text: &str) -> String {
    if text.starts_with("Deleting") {
        text.blue().bold().to_string()
    } else if text.starts_with("Next Monitoring") {
        text.red().bold().to_string()
    } else if text.starts_with("Error") {
        text.red().to_string()
    } else {
        text.to_string()
    }
}
