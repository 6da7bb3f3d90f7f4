pub mod broadcast;
pub mod handlers;
pub mod server;
pub mod stream;
pub mod subscriber;

pub use broadcast::{Broadcaster, Delivery};
pub use server::{build_router, start, AppState, ServerConfig, ServerError, ServerHandle};
pub use subscriber::SubscriberRegistry;
