//! Terminal chat interface
//!
//! Built directly on crossterm: the app loop owns the [`SessionController`]
//! and is the only place that applies session updates. Rendering goes through
//! plain [`text::Line`] values so layout can be tested without a terminal.
//!
//! [`SessionController`]: parley_core::SessionController

pub mod app;
pub mod input;
pub mod markdown;
pub mod message_list;
pub mod terminal;
pub mod text;
pub mod theme;

pub use app::ChatApp;
