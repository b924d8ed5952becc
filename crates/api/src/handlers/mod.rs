pub mod admin;
pub mod bid_card;
pub mod message;
pub mod mock;
