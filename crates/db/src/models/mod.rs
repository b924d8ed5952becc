//! Row structs for the InstaBids tables.
//!
//! Each `FromRow` struct mirrors one table; conversions into the domain
//! types in `instabids_core` parse the stored enumeration strings.

pub mod bid_card;
pub mod contractor_bid;
pub mod message;
