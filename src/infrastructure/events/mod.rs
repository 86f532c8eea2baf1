//! Events - 朗读事件广播

mod publisher;

pub use publisher::{EventPublisher, NarrationEvent};
