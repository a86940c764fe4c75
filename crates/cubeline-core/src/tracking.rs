//! Long-running change tracking over an OData collection.
//!
//! The first request returns a full snapshot. After that the server hands out
//! either a forward link (more of the current batch, fetched immediately) or a
//! delta link (resume later, fetched after the poll interval). A response with
//! neither ends tracking.

use std::time::Duration;

use crate::error::FetchError;
use crate::session::Transport;
use crate::shutdown::CancelToken;

/// `Prefer` header value asking the server for delta links
pub const TRACK_CHANGES: &str = "odata.track-changes";

/// Default wait between delta polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Tokens a handler extracts from one change-feed response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuation {
    /// More changes are available right now
    pub next: Option<String>,
    /// Resume from here after waiting
    pub delta: Option<String>,
}

/// Tracker state between requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackState {
    /// Request `target` immediately
    Fetching(String),
    /// Request `target` once the interval has elapsed
    Waiting(String),
    Stopped,
}

impl TrackState {
    /// Transition taken after a response; a forward link wins over a delta link
    pub fn after(continuation: Continuation) -> Self {
        match continuation {
            Continuation {
                next: Some(next), ..
            } => Self::Fetching(next),
            Continuation {
                delta: Some(delta),
                ..
            } => Self::Waiting(delta),
            _ => Self::Stopped,
        }
    }
}

/// Why tracking ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Server offered no way to resume
    Stopped,
    /// Cancel token fired
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSummary {
    pub requests: usize,
    pub outcome: TrackOutcome,
}

/// Follows continuation tokens until stopped or cancelled.
pub struct ChangeTracker<T> {
    transport: T,
    interval: Duration,
    cancel: CancelToken,
}

impl<T: Transport> ChangeTracker<T> {
    pub fn new(transport: T, interval: Duration, cancel: CancelToken) -> Self {
        Self {
            transport,
            interval,
            cancel,
        }
    }

    /// Track `initial` and hand every response body to `handler`.
    ///
    /// One request is outstanding at a time. The cancel token is checked
    /// before each request and observed while waiting, so cancellation never
    /// lets another request out.
    pub fn track<F, E>(&self, initial: &str, mut handler: F) -> Result<TrackSummary, E>
    where
        F: FnMut(&str) -> Result<Continuation, E>,
        E: From<FetchError>,
    {
        let mut state = TrackState::Fetching(initial.to_string());
        let mut requests = 0usize;
        let cancelled = |requests| TrackSummary {
            requests,
            outcome: TrackOutcome::Cancelled,
        };

        loop {
            let target = match state {
                TrackState::Fetching(target) => target,
                TrackState::Waiting(target) => {
                    if !self.cancel.sleep(self.interval) {
                        log::debug!("change tracking cancelled while waiting");
                        return Ok(cancelled(requests));
                    }
                    target
                }
                TrackState::Stopped => {
                    log::info!("server offered no further changes, tracking stopped");
                    return Ok(TrackSummary {
                        requests,
                        outcome: TrackOutcome::Stopped,
                    });
                }
            };
            if self.cancel.is_cancelled() {
                return Ok(cancelled(requests));
            }

            requests += 1;
            let operation = format!("track changes (request {requests})");
            let body = self.transport.get(&target, Some(TRACK_CHANGES), &operation)?;
            state = TrackState::after(handler(&body)?);
            log::trace!("{operation}: next state {state:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::test_utils::ScriptedTransport;

    fn delta(token: &str) -> Continuation {
        Continuation {
            next: None,
            delta: Some(token.to_string()),
        }
    }

    fn next(token: &str) -> Continuation {
        Continuation {
            next: Some(token.to_string()),
            delta: None,
        }
    }

    /// Bodies are "next:<t>", "delta:<t>" or "" (no tokens)
    fn parse(body: &str) -> Result<Continuation, FetchError> {
        Ok(match body.split_once(':') {
            Some(("next", t)) => next(t),
            Some(("delta", t)) => delta(t),
            _ => Continuation::default(),
        })
    }

    #[test]
    fn transitions() {
        assert_eq!(
            TrackState::after(next("n")),
            TrackState::Fetching("n".to_string())
        );
        assert_eq!(
            TrackState::after(delta("d")),
            TrackState::Waiting("d".to_string())
        );
        assert_eq!(
            TrackState::after(Continuation {
                next: Some("n".to_string()),
                delta: Some("d".to_string()),
            }),
            TrackState::Fetching("n".to_string())
        );
        assert_eq!(TrackState::after(Continuation::default()), TrackState::Stopped);
    }

    #[test]
    fn snapshot_then_empty_delta_stops_after_two_requests() {
        let transport = ScriptedTransport::bodies(["delta:d1", ""]);
        let tracker =
            ChangeTracker::new(&transport, Duration::from_millis(10), CancelToken::new());
        let summary = tracker
            .track("TransactionLogEntries", parse)
            .unwrap();
        assert_eq!(
            summary,
            TrackSummary {
                requests: 2,
                outcome: TrackOutcome::Stopped,
            }
        );
        assert_eq!(transport.targets(), ["TransactionLogEntries", "d1"]);
    }

    #[test]
    fn every_request_asks_for_tracking() {
        let transport = ScriptedTransport::bodies(["next:n1", "delta:d1", ""]);
        let tracker = ChangeTracker::new(&transport, Duration::ZERO, CancelToken::new());
        tracker.track("Entries", parse).unwrap();
        assert!(transport
            .requests()
            .iter()
            .all(|(_, prefer)| prefer.as_deref() == Some(TRACK_CHANGES)));
    }

    #[test]
    fn forward_link_is_followed_without_waiting() {
        let transport = ScriptedTransport::bodies(["next:n1", "next:n2", ""]);
        let tracker =
            ChangeTracker::new(&transport, Duration::from_secs(60), CancelToken::new());
        let start = Instant::now();
        let summary = tracker.track("Entries", parse).unwrap();
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(summary.requests, 3);
        assert_eq!(transport.targets(), ["Entries", "n1", "n2"]);
    }

    #[test]
    fn cancel_during_wait_issues_no_further_request() {
        let transport = ScriptedTransport::bodies(["delta:d1", "delta:d2"]);
        let cancel = CancelToken::new();
        let tracker = ChangeTracker::new(&transport, Duration::from_secs(60), cancel.clone());
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel.cancel();
        });
        let summary = tracker.track("Entries", parse).unwrap();
        handle.join().unwrap();
        assert_eq!(
            summary,
            TrackSummary {
                requests: 1,
                outcome: TrackOutcome::Cancelled,
            }
        );
        assert_eq!(transport.remaining(), 1);
    }

    #[test]
    fn cancelled_before_start_issues_nothing() {
        let transport = ScriptedTransport::bodies(["delta:d1"]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let tracker = ChangeTracker::new(&transport, Duration::ZERO, cancel);
        let summary = tracker.track("Entries", parse).unwrap();
        assert_eq!(summary.requests, 0);
        assert!(transport.targets().is_empty());
    }

    #[test]
    fn handler_can_cancel_from_inside() {
        let transport = ScriptedTransport::bodies(["next:n1", "next:n2", "next:n3"]);
        let cancel = CancelToken::new();
        let tracker = ChangeTracker::new(&transport, Duration::ZERO, cancel.clone());
        let mut seen = 0;
        let summary = tracker
            .track("Entries", |body| {
                seen += 1;
                if seen == 2 {
                    cancel.cancel();
                }
                parse(body)
            })
            .unwrap();
        assert_eq!(summary.requests, 2);
        assert_eq!(summary.outcome, TrackOutcome::Cancelled);
    }

    #[test]
    fn failed_request_is_fatal() {
        let transport = ScriptedTransport::bodies(["delta:d1"]);
        let tracker = ChangeTracker::new(&transport, Duration::ZERO, CancelToken::new());
        // second request finds the script exhausted
        let err = tracker.track("Entries", parse).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
