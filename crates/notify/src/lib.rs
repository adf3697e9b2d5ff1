//! Outbound notification delivery.
//!
//! A [`dispatcher::NotificationDispatcher`] tries an ordered chain of
//! [`channel::DeliveryChannel`]s until one delivers, then records the
//! outcome in the email audit log. When every real channel is unavailable
//! the message is still written to the audit trail (provider tag
//! `logged`), so no notification disappears silently, but the dispatcher
//! reports `false` because nothing was actually delivered.
//!
//! Delivery must never crash workflow execution: every failure here is
//! logged and swallowed.

pub mod audit;
pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod message;

pub use audit::{EmailAudit, PgEmailAudit};
pub use channel::{ChannelError, DeliveryChannel};
pub use dispatcher::NotificationDispatcher;
pub use message::NotificationMessage;
