//! Mock upstream chat service
//!
//! Speaks the same wire format as the real upstream: `POST /api/chat` with a
//! `{"messages": [...]}` body, answered by a `text/event-stream` of
//! `data: {"text": ...}` frames terminated by `data: [DONE]`.
//!
//! Point `parley serve --upstream-url` at it to exercise the proxy and client
//! without a model behind them:
//!
//! ```bash
//! parley-mock-upstream --behavior echo --port 5000
//! parley-mock-upstream --behavior slow --chunk-delay 200
//! parley-mock-upstream --behavior fail
//! ```

mod behaviors;
mod server;
mod streaming;

pub use behaviors::UpstreamBehavior;
pub use server::{router, MockUpstreamConfig};
pub use streaming::{echo_text, reply_frames, DONE_FRAME};
