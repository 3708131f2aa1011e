//! Completion reporting
//!
//! Two delivery strategies exist for historical reasons. The canonical one
//! is promise-style: `process` returns `Result<QueryOutcome>`. The
//! event-style strategy mirrors the original pipeline protocol, where the
//! adapter emitted `done`/`error` events tagged with its own name; it is
//! kept as a thin adapter over the canonical path.

use crate::traits::QueryOutcome;
use dblayer_core::DbLayerError;
use tokio::sync::mpsc;

/// One completion event, attributed to the adapter instance that issued it
#[derive(Debug)]
pub enum Completion {
    /// The work item succeeded with a normalized outcome
    Done {
        source: String,
        output: QueryOutcome,
    },

    /// The work item failed
    Error {
        source: String,
        error: DbLayerError,
    },
}

impl Completion {
    /// Name of the adapter instance that produced this event
    pub fn source(&self) -> &str {
        match self {
            Completion::Done { source, .. } => source,
            Completion::Error { source, .. } => source,
        }
    }

    /// True for a `Done` event
    pub fn is_done(&self) -> bool {
        matches!(self, Completion::Done { .. })
    }
}

/// Sending half of the event-style completion channel
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Completion>,
}

impl EventSink {
    /// Create a sink together with the receiving half the host listens on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit a `done` event
    pub fn done(&self, source: &str, output: QueryOutcome) {
        self.send(Completion::Done {
            source: source.to_string(),
            output,
        });
    }

    /// Emit an `error` event
    pub fn error(&self, source: &str, error: DbLayerError) {
        self.send(Completion::Error {
            source: source.to_string(),
            error,
        });
    }

    /// Emit whichever event matches the result
    pub fn report(&self, source: &str, result: Result<QueryOutcome, DbLayerError>) {
        match result {
            Ok(output) => self.done(source, output),
            Err(error) => self.error(source, error),
        }
    }

    fn send(&self, completion: Completion) {
        // A dropped receiver means the host stopped listening; there is
        // nowhere left to report to.
        if self.tx.send(completion).is_err() {
            tracing::trace!("completion receiver dropped; event discarded");
        }
    }
}
