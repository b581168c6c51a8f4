mod chat;
mod health;

pub use chat::chat_routes;
pub use health::health_routes;
