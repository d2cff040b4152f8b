//! Real-time Push
//!
//! Open WebSocket connections are tracked by the [`ConnectionRegistry`];
//! the [`Broadcaster`] fans newly created events and incidents out to all
//! of them. Delivery is best effort: nothing is persisted or replayed.

pub mod notification;
pub mod connection;
pub mod registry;
pub mod broadcast;
pub mod generator;

pub use notification::{Notification, PongPayload};
pub use connection::{Connection, ConnectionId, ConnectionState, DeliveryError, Lifecycle, WsConnection};
pub use registry::ConnectionRegistry;
pub use broadcast::{BroadcastReport, Broadcaster, DEFAULT_SEND_TIMEOUT};
pub use generator::{EventGenerator, GeneratorConfig};
