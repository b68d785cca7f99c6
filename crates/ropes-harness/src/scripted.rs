//! A transport that answers from a script.
//!
//! Every request is recorded before it is answered, so tests can count
//! fetches right after `dispatch` returns. Replies are fixed per URL:
//!
//! - [`reply`](ScriptedTransport::reply): resolve immediately with a payload
//! - [`fail`](ScriptedTransport::fail): resolve immediately with an error
//! - [`hold`](ScriptedTransport::hold): stay pending until
//!   [`complete`](ScriptedTransport::complete) or
//!   [`reject`](ScriptedTransport::reject) is called
//!
//! Unscripted URLs fail with [`TransportError::Unavailable`].
//!
//! Clones share the same script, so a test keeps one handle while the
//! loader owns another.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use ahash::AHashMap;
use ropes::{Transport, TransportError};
use serde_json::Value;
use tokio::sync::oneshot;

type Reply = Result<Value, TransportError>;

#[derive(Debug, Clone)]
enum Script {
    Json(Value),
    Fail(String),
    Hold,
}

#[derive(Debug, Default)]
struct State {
    script: AHashMap<String, Script>,
    requests: Vec<String>,
    held: Vec<(String, oneshot::Sender<Reply>)>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Rc<RefCell<State>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `payload`.
    pub fn reply(&self, url: impl Into<String>, payload: Value) -> &Self {
        self.state
            .borrow_mut()
            .script
            .insert(url.into(), Script::Json(payload));
        self
    }

    /// Answer `url` with an error.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) -> &Self {
        self.state
            .borrow_mut()
            .script
            .insert(url.into(), Script::Fail(message.into()));
        self
    }

    /// Leave requests for `url` pending until completed by hand.
    pub fn hold(&self, url: impl Into<String>) -> &Self {
        self.state.borrow_mut().script.insert(url.into(), Script::Hold);
        self
    }

    /// Resolve every held request for `url` with `payload`. Returns how many
    /// were waiting.
    pub fn complete(&self, url: &str, payload: Value) -> usize {
        self.release(url, |_| Ok(payload.clone()))
    }

    /// Fail every held request for `url`. Returns how many were waiting.
    pub fn reject(&self, url: &str, message: &str) -> usize {
        self.release(url, |url| Err(TransportError::unavailable(url, message)))
    }

    fn release(&self, url: &str, reply: impl Fn(&str) -> Reply) -> usize {
        let waiting: Vec<_> = {
            let mut state = self.state.borrow_mut();
            let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.held)
                .into_iter()
                .partition(|(held, _)| held == url);
            state.held = rest;
            matching
        };
        let count = waiting.len();
        for (held, sender) in waiting {
            // The fetch task may have been dropped; nothing to deliver then.
            let _ = sender.send(reply(&held));
        }
        count
    }

    /// Every requested URL, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.borrow().requests.clone()
    }

    /// How many times `url` was requested.
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|requested| *requested == url)
            .count()
    }

    /// Requests still waiting on [`complete`](Self::complete).
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.state.borrow().held.len()
    }
}

enum Pending {
    Ready(Reply),
    Waiting(oneshot::Receiver<Reply>),
}

impl Transport for ScriptedTransport {
    fn fetch_json(&self, url: &str) -> impl Future<Output = Reply> + 'static {
        let mut state = self.state.borrow_mut();
        state.requests.push(url.to_string());
        tracing::trace!(url, "harness.fetch");

        let pending = match state.script.get(url).cloned() {
            Some(Script::Json(payload)) => Pending::Ready(Ok(payload)),
            Some(Script::Fail(message)) => {
                Pending::Ready(Err(TransportError::unavailable(url, message)))
            }
            Some(Script::Hold) => {
                let (sender, receiver) = oneshot::channel();
                state.held.push((url.to_string(), sender));
                Pending::Waiting(receiver)
            }
            None => Pending::Ready(Err(TransportError::unavailable(url, "no scripted reply"))),
        };
        let url = url.to_string();
        async move {
            match pending {
                Pending::Ready(reply) => reply,
                Pending::Waiting(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err(TransportError::unavailable(url, "reply dropped"))),
            }
        }
    }
}
