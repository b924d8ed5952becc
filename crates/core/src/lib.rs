//! Domain core for the InstaBids marketplace.
//!
//! Everything in this crate is free of network and database dependencies:
//! the bid-card schema and its validation, the creation wizard state
//! machine, the message sender-labeling heuristic, the admin passthrough
//! input rules, and the services that delegate durable storage to the
//! collaborator traits in [`persistence`].

pub mod admin;
pub mod bid_card;
pub mod error;
pub mod memory;
pub mod messaging;
pub mod pagination;
pub mod persistence;
pub mod services;
pub mod types;
pub mod validation;
pub mod wizard;
