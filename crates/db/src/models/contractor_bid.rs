//! Contractor bid rows.

use serde::Deserialize;
use sqlx::FromRow;

use instabids_core::bid_card::ContractorBidStatus;
use instabids_core::messaging::ContractorSummary;
use instabids_core::persistence::StoreError;
use instabids_core::types::EntityId;

/// Contractor summary projection of a `contractor_bids` row.
#[derive(Debug, Clone, FromRow)]
pub struct ContractorBidRow {
    pub contractor_id: EntityId,
    pub contractor_name: String,
    pub company: Option<String>,
    pub bid_amount: Option<f64>,
    pub status: String,
}

impl ContractorBidRow {
    pub fn into_summary(self) -> Result<ContractorSummary, StoreError> {
        let status = ContractorBidStatus::from_str_db(&self.status).map_err(StoreError::backend)?;
        Ok(ContractorSummary {
            id: self.contractor_id,
            name: self.contractor_name,
            company: self.company,
            bid_amount: self.bid_amount,
            status,
        })
    }
}

/// DTO for recording a contractor's bid.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContractorBid {
    pub project_id: EntityId,
    pub contractor_id: EntityId,
    pub contractor_name: String,
    pub company: Option<String>,
    pub bid_amount: Option<f64>,
}
