//! Domain services. Each validates input, delegates durable work to the
//! collaborator traits, and turns collaborator failures into [`CoreError`]s.
//!
//! [`CoreError`]: crate::error::CoreError

pub mod bid_card;
pub mod message;

pub use bid_card::BidCardService;
pub use message::MessageService;
