//! # LogWriter: stdout event printer
//!
//! A minimal subscriber printing every event on one line. Meant for demos and debugging.
//!
//! ## Example output
//! ```text
//! [starting] flow="fetch"
//! [attempt-failed] flow="fetch" task="download" attempt=1 err="connection refused"
//! [retry] flow="fetch" task="download" attempt=2 delay_ms=100
//! [stage] flow="pipeline" index=0
//! [suppressed] flow="upload" index=3 err="timeout"
//! [completed] flow="fetch"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Constructs a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders `e` as a single log line.
    pub fn format(e: &Event) -> String {
        let flow = e.flow.as_deref().unwrap_or("-");
        let task = e.task.as_deref().unwrap_or("-");
        let err = e.reason.as_deref().unwrap_or("-");
        let index = e.index.unwrap_or_default();
        let attempt = e.attempt.unwrap_or_default();

        match e.kind {
            EventKind::FlowStarting => format!("[starting] flow={flow:?}"),
            EventKind::FlowCompleted => format!("[completed] flow={flow:?}"),
            EventKind::FlowFailed => format!("[failed] flow={flow:?} err={err:?}"),
            EventKind::StageCompleted => format!("[stage] flow={flow:?} index={index}"),
            EventKind::BranchCompleted => format!("[branch] flow={flow:?} index={index}"),
            EventKind::BranchFailed => {
                format!("[branch-failed] flow={flow:?} index={index} err={err:?}")
            }
            EventKind::FailureSuppressed => {
                format!("[suppressed] flow={flow:?} index={index} err={err:?}")
            }
            EventKind::AttemptFailed => format!(
                "[attempt-failed] flow={flow:?} task={task:?} attempt={attempt} err={err:?}"
            ),
            EventKind::RetryScheduled => match e.delay_ms {
                Some(ms) => format!(
                    "[retry] flow={flow:?} task={task:?} attempt={attempt} delay_ms={ms}"
                ),
                None => format!("[retry] flow={flow:?} task={task:?} attempt={attempt}"),
            },
            EventKind::RetryExhausted => format!(
                "[retry-exhausted] flow={flow:?} task={task:?} attempts={attempt} err={err:?}"
            ),
            EventKind::IterationCompleted => {
                format!("[iteration] flow={flow:?} task={task:?} n={attempt}")
            }
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={task:?} reason={err:?}")
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={task} info={err}")
            }
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retry_line_includes_delay_only_when_set() {
        let ev = Event::new(EventKind::RetryScheduled)
            .with_flow("fetch")
            .with_task("download")
            .with_attempt(2);
        assert_eq!(
            LogWriter::format(&ev),
            r#"[retry] flow="fetch" task="download" attempt=2"#
        );

        let ev = ev.with_delay(Duration::from_millis(100));
        assert_eq!(
            LogWriter::format(&ev),
            r#"[retry] flow="fetch" task="download" attempt=2 delay_ms=100"#
        );
    }

    #[test]
    fn test_missing_fields_render_as_dash() {
        let ev = Event::new(EventKind::FlowFailed);
        assert_eq!(LogWriter::format(&ev), r#"[failed] flow="-" err="-""#);
    }
}
