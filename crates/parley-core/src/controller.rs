//! Session controller
//!
//! Owns the [`ChatSession`] and drives it from two kinds of background work:
//! simulated reveals and network replies. Background tasks never touch the
//! session directly; they post [`SessionUpdate`]s on a channel and the owner
//! of the controller feeds them back through [`SessionController::apply`]
//! from its event loop, so the turn list has exactly one writer.
//!
//! Every update carries the epoch it was started in. "New chat" bumps the
//! epoch, which abandons in-flight replies without tearing down connections.

use crate::event_stream::{EventStreamDecoder, StreamItem};
use crate::session::{ChatSession, ReplySource};
use crate::simulator::{self, RevealOptions, RevealOutcome};
use crate::transport::{ChatTransport, TransportError};
use crate::turn::Turn;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const WELCOME_MESSAGE: &str = "Welcome! I'm your chat assistant, and I'm here to help answer any questions you may have. Feel free to ask me anything. How can I assist you today?";
pub const APOLOGY_MESSAGE: &str = "Sorry, an error occurred. Please try again.";
pub const DEFAULT_THINKING_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub reveal: RevealOptions,
    /// How long loading must last before the thinking placeholder shows
    pub thinking_delay: Duration,
    pub welcome: String,
    pub apology: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            reveal: RevealOptions::default(),
            thinking_delay: DEFAULT_THINKING_DELAY,
            welcome: WELCOME_MESSAGE.to_string(),
            apology: APOLOGY_MESSAGE.to_string(),
        }
    }
}

/// Work results posted back to the controller's owner
#[derive(Debug)]
pub enum SessionUpdate {
    /// The simulator revealed more of its message
    Revealed { epoch: u64, content: String },
    /// The simulator stopped
    RevealEnded { epoch: u64, outcome: RevealOutcome },
    /// Accumulated reply text so far
    ReplyText { epoch: u64, content: String },
    /// The reply body ended
    ReplyEnded { epoch: u64 },
    /// The request or the body failed
    ReplyFailed { epoch: u64, error: TransportError },
}

impl SessionUpdate {
    fn epoch(&self) -> u64 {
        match self {
            SessionUpdate::Revealed { epoch, .. }
            | SessionUpdate::RevealEnded { epoch, .. }
            | SessionUpdate::ReplyText { epoch, .. }
            | SessionUpdate::ReplyEnded { epoch }
            | SessionUpdate::ReplyFailed { epoch, .. } => *epoch,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Message is empty")]
    EmptyInput,

    /// A reply or simulation is still in flight
    #[error("Still waiting for the previous reply")]
    Busy,
}

pub struct SessionController<T: ?Sized> {
    session: ChatSession,
    transport: Arc<T>,
    settings: ControllerSettings,
    updates: mpsc::UnboundedSender<SessionUpdate>,
    simulation: CancellationToken,
    epoch: u64,
}

impl<T> SessionController<T>
where
    T: ChatTransport + ?Sized + 'static,
{
    /// Create a controller and the receiver its background work reports on.
    pub fn new(
        transport: Arc<T>,
        settings: ControllerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session: ChatSession::new(),
            transport,
            settings,
            updates,
            simulation: CancellationToken::new(),
            epoch: 0,
        };
        (controller, rx)
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Nothing is loading, streaming or being revealed.
    pub fn is_idle(&self) -> bool {
        !self.session.is_loading()
    }

    pub fn thinking_visible(&self) -> bool {
        self.session.thinking_visible(self.settings.thinking_delay)
    }

    /// Play the welcome message once per conversation.
    pub fn mount(&mut self) {
        if self.session.welcome_shown() {
            return;
        }
        self.session.mark_welcome_shown();
        let welcome = self.settings.welcome.clone();
        self.simulate(welcome);
    }

    /// Append a user turn and request a reply for the whole history.
    pub fn submit(&mut self, input: &str) -> Result<(), SubmitError> {
        if input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.session.is_loading() {
            return Err(SubmitError::Busy);
        }

        self.session.push_user(input);
        self.session.begin_loading();
        self.session.set_streaming(false);
        self.session.set_simulated(false);

        let history = self.session.history();
        let transport = Arc::clone(&self.transport);
        let updates = self.updates.clone();
        let epoch = self.epoch;

        tokio::spawn(async move {
            relay_reply(transport.as_ref(), history, epoch, &updates).await;
        });
        Ok(())
    }

    /// Abandon the current conversation and start over with the welcome.
    pub fn new_chat(&mut self) {
        self.simulation.cancel();
        self.epoch += 1;
        self.session.reset();
        tracing::debug!(epoch = self.epoch, "Started new chat");
        self.mount();
    }

    /// Fold one background update into the session. Updates from an
    /// abandoned conversation are dropped.
    pub fn apply(&mut self, update: SessionUpdate) {
        if update.epoch() != self.epoch {
            tracing::trace!(?update, "Dropping update from abandoned conversation");
            return;
        }

        match update {
            SessionUpdate::Revealed { content, .. } => {
                self.session
                    .upsert_assistant(&content, ReplySource::Simulated);
            }
            SessionUpdate::RevealEnded { .. } => {
                self.session.end_loading();
                self.session.set_simulated(false);
            }
            SessionUpdate::ReplyText { content, .. } => {
                self.session.set_streaming(true);
                self.session.upsert_assistant(&content, ReplySource::Network);
            }
            SessionUpdate::ReplyEnded { .. } => {
                self.session.end_loading();
                self.session.set_streaming(false);
            }
            SessionUpdate::ReplyFailed { error, .. } => {
                tracing::warn!(error = %error, "Chat request failed");
                self.session.end_loading();
                self.session.set_streaming(false);
                let apology = self.settings.apology.clone();
                self.simulate(apology);
            }
        }
    }

    fn simulate(&mut self, message: String) {
        self.simulation.cancel();
        let cancel = CancellationToken::new();
        self.simulation = cancel.clone();

        self.session.begin_loading();
        self.session.set_simulated(true);

        let updates = self.updates.clone();
        let options = self.settings.reveal;
        let epoch = self.epoch;

        tokio::spawn(async move {
            let outcome = simulator::reveal(&message, options, &cancel, |content| {
                let _ = updates.send(SessionUpdate::Revealed {
                    epoch,
                    content: content.to_string(),
                });
            })
            .await;
            let _ = updates.send(SessionUpdate::RevealEnded { epoch, outcome });
        });
    }
}

/// Send the history, decode the reply and post accumulated text updates.
async fn relay_reply<T>(
    transport: &T,
    history: Vec<Turn>,
    epoch: u64,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) where
    T: ChatTransport + ?Sized,
{
    let mut body = match transport.send(&history).await {
        Ok(body) => body,
        Err(error) => {
            let _ = updates.send(SessionUpdate::ReplyFailed { epoch, error });
            return;
        }
    };

    let mut decoder = EventStreamDecoder::new();
    let mut reply = String::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(error) => {
                let _ = updates.send(SessionUpdate::ReplyFailed { epoch, error });
                return;
            }
        };
        if !post_items(decoder.feed(&chunk), &mut reply, epoch, updates) {
            return;
        }
    }

    post_items(decoder.finish(), &mut reply, epoch, updates);
    let _ = updates.send(SessionUpdate::ReplyEnded { epoch });
}

/// Returns false once nobody is listening any more.
fn post_items(
    items: Vec<StreamItem>,
    reply: &mut String,
    epoch: u64,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) -> bool {
    for item in items {
        if let StreamItem::Text(text) = item {
            reply.push_str(&text);
            let update = SessionUpdate::ReplyText {
                epoch,
                content: reply.clone(),
            };
            if updates.send(update).is_err() {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ByteStream;
    use crate::turn::Role;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Replays canned chunks and records every history it was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        chunks: Vec<&'static str>,
        fail_status: Option<u16>,
        requests: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedTransport {
        fn replying(chunks: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                chunks,
                ..Default::default()
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                fail_status: Some(status),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, turns: &[Turn]) -> Result<ByteStream, TransportError> {
            self.requests.lock().unwrap().push(turns.to_vec());
            if let Some(status) = self.fail_status {
                return Err(TransportError::Status { status });
            }
            let chunks: Vec<Result<Bytes, TransportError>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            Ok(futures::stream::iter(chunks).boxed())
        }
    }

    fn quick_settings() -> ControllerSettings {
        ControllerSettings {
            welcome: "Hi there".to_string(),
            ..Default::default()
        }
    }

    async fn run_until_idle<T: ChatTransport + ?Sized + 'static>(
        controller: &mut SessionController<T>,
        rx: &mut mpsc::UnboundedReceiver<SessionUpdate>,
    ) {
        while !controller.is_idle() {
            let update = rx.recv().await.expect("update channel closed");
            controller.apply(update);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_plays_welcome_without_network() {
        let transport = ScriptedTransport::replying(vec![]);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        controller.mount();
        assert!(controller.session().is_simulated());
        run_until_idle(&mut controller, &mut rx).await;

        let turns = controller.session().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].content, "Hi there");
        assert!(transport.requests.lock().unwrap().is_empty());

        // A second mount does not replay
        controller.mount();
        assert!(controller.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_streamed_reply_builds_one_assistant_turn() {
        let transport = ScriptedTransport::replying(vec![
            "data: {\"text\":\"Hel\"}\n\n",
            "data: {\"text\":\"lo\"}\n\n",
            "data: [DONE]\n\n",
        ]);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        controller.submit("greet me").unwrap();
        run_until_idle(&mut controller, &mut rx).await;

        let turns = controller.session().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "greet me");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Hello");
        assert!(!controller.session().is_streaming());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_sends_full_history() {
        let transport = ScriptedTransport::replying(vec!["data: {\"text\":\"ok\"}\n\n"]);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        controller.mount();
        run_until_idle(&mut controller, &mut rx).await;
        controller.submit("first").unwrap();
        run_until_idle(&mut controller, &mut rx).await;
        controller.submit("second").unwrap();
        run_until_idle(&mut controller, &mut rx).await;

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            vec![
                Turn::assistant("Hi there"),
                Turn::user("first"),
                Turn::assistant("ok"),
                Turn::user("second"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_plays_apology() {
        let transport = ScriptedTransport::failing(503);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        controller.submit("hello?").unwrap();
        run_until_idle(&mut controller, &mut rx).await;

        let turns = controller.session().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, APOLOGY_MESSAGE);
        assert!(!turns[1].animated);
        assert!(!controller.session().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_empty_and_concurrent_submissions() {
        let transport = ScriptedTransport::replying(vec!["data: {\"text\":\"ok\"}\n\n"]);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        assert_eq!(controller.submit("   "), Err(SubmitError::EmptyInput));

        controller.mount();
        assert_eq!(controller.submit("too soon"), Err(SubmitError::Busy));

        run_until_idle(&mut controller, &mut rx).await;
        assert_eq!(controller.submit("now"), Ok(()));
        assert_eq!(controller.submit("again"), Err(SubmitError::Busy));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_chat_clears_and_replays_welcome_once() {
        let transport = ScriptedTransport::replying(vec!["data: {\"text\":\"ok\"}\n\n"]);
        let settings = ControllerSettings {
            welcome: "Welcome back to the chat".to_string(),
            ..Default::default()
        };
        let (mut controller, mut rx) = SessionController::new(Arc::clone(&transport), settings);

        controller.mount();
        // Let the welcome get part way, then start over
        let first = rx.recv().await.unwrap();
        controller.apply(first);
        controller.new_chat();

        assert!(controller.session().turns().is_empty());
        assert!(controller.session().welcome_shown());
        run_until_idle(&mut controller, &mut rx).await;

        let turns = controller.session().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "Welcome back to the chat");

        // Stale updates from the first welcome never reach the new session
        while let Ok(update) = rx.try_recv() {
            controller.apply(update);
        }
        assert_eq!(controller.session().turns().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_chat_abandons_inflight_reply() {
        let transport = ScriptedTransport::replying(vec![
            "data: {\"text\":\"stale\"}\n\n",
            "data: [DONE]\n\n",
        ]);
        let (mut controller, mut rx) =
            SessionController::new(Arc::clone(&transport), quick_settings());

        controller.submit("question").unwrap();
        controller.new_chat();
        run_until_idle(&mut controller, &mut rx).await;

        // Drain whatever the abandoned reply still posts
        tokio::task::yield_now().await;
        while let Ok(update) = rx.try_recv() {
            controller.apply(update);
        }

        let turns = controller.session().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "Hi there");
    }
}
