pub mod events;
pub mod frame;
pub mod ids;

pub use events::TriggerEvent;
pub use frame::Frame;
pub use ids::SubscriberId;
