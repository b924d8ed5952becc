//! The bid card: a homeowner's project listing that contractors bid on.

pub mod model;
pub mod schema;
pub mod status;

pub use model::{
    BidCard, BidCardDetails, BidCardForm, Location, MediaAttachment, MediaUpload, NewMedia,
    NumericInput,
};
pub use schema::{validate, validate_media, SubmissionMode, ValidationContext};
pub use status::{BidStatus, ContractorBidStatus, ListingStatus, TimelineHorizon};
