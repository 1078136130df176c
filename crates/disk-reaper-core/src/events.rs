use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Short "what am I doing now" line.
    Status,
    /// Entry for the activity log.
    Log,
    /// Time left until the next sweep.
    Countdown,
}

#[derive(Debug, Clone)]
pub struct ReaperEvent {
    pub kind: EventKind,
    pub text: String,
    pub at: DateTime<Local>,
}

/// Fire-and-forget event output.
///
/// Events are mirrored to `tracing` and, when a consumer is attached, pushed
/// onto a bounded channel. A full channel drops the event rather than stall
/// the sweep.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<Sender<ReaperEvent>>,
}

impl EventSink {
    pub fn channel(capacity: usize) -> (Self, Receiver<ReaperEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Tracing only.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn status(&self, text: impl Into<String>) {
        self.emit(EventKind::Status, text.into());
    }

    pub fn log(&self, text: impl Into<String>) {
        self.emit(EventKind::Log, text.into());
    }

    pub fn countdown(&self, text: impl Into<String>) {
        self.emit(EventKind::Countdown, text.into());
    }

    fn emit(&self, kind: EventKind, text: String) {
        match kind {
            EventKind::Status => debug!("{}", text),
            EventKind::Log => info!("{}", text),
            EventKind::Countdown => trace!("{}", text),
        }

        let Some(tx) = &self.tx else {
            return;
        };
        let event = ReaperEvent {
            kind,
            text,
            at: Local::now(),
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => trace!("Event queue full, dropping event"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sink, rx) = EventSink::channel(8);
        sink.status("Checking target: /a");
        sink.log("Deleting x.log");
        sink.countdown("Next monitoring will start in...0min 1sec");

        let kinds: Vec<EventKind> = rx.try_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Status, EventKind::Log, EventKind::Countdown]
        );
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let (sink, rx) = EventSink::channel(2);
        for i in 0..10 {
            sink.log(format!("line {}", i));
        }
        let texts: Vec<String> = rx.try_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["line 0".to_string(), "line 1".to_string()]);
    }

    #[test]
    fn test_disconnected_consumer_is_ignored() {
        let (sink, rx) = EventSink::channel(2);
        drop(rx);
        sink.status("still fine");
        EventSink::silent().log("nobody listening");
    }
}
