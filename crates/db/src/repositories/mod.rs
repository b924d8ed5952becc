//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a connection inside a transaction) as the first
//! argument.

pub mod admin_table_repo;
pub mod bid_card_media_repo;
pub mod bid_card_repo;
pub mod contractor_bid_repo;
pub mod message_repo;

pub use admin_table_repo::AdminTableRepo;
pub use bid_card_media_repo::BidCardMediaRepo;
pub use bid_card_repo::BidCardRepo;
pub use contractor_bid_repo::ContractorBidRepo;
pub use message_repo::MessageRepo;
