//! Message and order protocol between soldiers, team AIs and the game
//! context
//!
//! Communication is asynchronous by default: a message goes into the
//! receiver's inbox and is processed when that actor next drains it.
//! Envelope ownership is shared between sender outbox and receiver inbox
//! until every receiver has processed it, at which point the sender's
//! cleanup pass reclaims it. Priority lives in orders, never in message
//! delivery - inboxes are strictly FIFO.

pub mod hub;
pub mod message;
pub mod order;

pub use hub::{ActorId, Envelope, MessageHub};
pub use message::Message;
pub use order::{Order, OrderId, OrderIdAllocator, OrderKind, OrderPriority, OrderState};
