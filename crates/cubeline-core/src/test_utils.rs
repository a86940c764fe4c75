//! In-memory transport for exercising fetchers, trackers and source adapters
//! without a server.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::FetchError;
use crate::session::Transport;

/// Replays a fixed sequence of responses and records every request made.
///
/// Once the script is exhausted every further request fails with a transport
/// error, so a fetcher that asks for more than expected fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<String, FetchError>>>,
    requests: RefCell<Vec<(String, Option<String>)>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<String, FetchError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Script of successful bodies
    pub fn bodies<S: Into<String>>(bodies: impl IntoIterator<Item = S>) -> Self {
        Self::new(bodies.into_iter().map(|b| Ok(b.into())))
    }

    /// Targets requested so far, in order
    pub fn targets(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Targets with the `Prefer` header sent alongside
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.borrow().clone()
    }

    /// Responses not consumed yet
    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        target: &str,
        prefer: Option<&str>,
        operation: &str,
    ) -> Result<String, FetchError> {
        self.requests
            .borrow_mut()
            .push((target.to_string(), prefer.map(str::to_string)));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    operation: operation.to_string(),
                    message: "no scripted response left".to_string(),
                })
            })
    }
}
