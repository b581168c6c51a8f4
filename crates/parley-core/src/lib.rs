//! # parley-core
//!
//! UI-agnostic building blocks shared by the parley proxy and client:
//!
//! - [`turn`]: the conversation model (`Turn`, `Role`, `DisplayTurn`)
//! - [`validation`]: the inbound payload contract enforced by the proxy
//! - [`event_stream`]: incremental decoding of `data: ` framed replies
//! - [`simulator`]: local, cancellable "typing" reveal of canned text
//! - [`session`] and [`controller`]: the client conversation state machine
//! - [`transport`]: the HTTP seam between the client and the proxy

pub mod controller;
pub mod event_stream;
pub mod session;
pub mod simulator;
pub mod transport;
pub mod turn;
pub mod validation;

pub use controller::{
    ControllerSettings, SessionController, SessionUpdate, SubmitError, APOLOGY_MESSAGE,
    WELCOME_MESSAGE,
};
pub use event_stream::{EventStreamDecoder, StreamItem};
pub use session::{ChatSession, ReplySource};
pub use simulator::{reveal, reveal_slices, RevealOptions, RevealOutcome};
pub use transport::{ByteStream, ChatRequest, ChatTransport, HttpTransport, TransportError};
pub use turn::{DisplayTurn, Role, Turn};
pub use validation::{validate_messages, validate_request, ValidationError};
