//! Repository for the `contractor_bids` table.

use sqlx::PgPool;
use uuid::Uuid;

use instabids_core::bid_card::ContractorBidStatus;
use instabids_core::types::EntityId;

use crate::models::contractor_bid::{ContractorBidRow, CreateContractorBid};

/// Column list for the contractor summary projection.
const COLUMNS: &str = "contractor_id, contractor_name, company, bid_amount, status";

pub struct ContractorBidRepo;

impl ContractorBidRepo {
    /// Contractors bidding on a project, in the order they bid.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: EntityId,
    ) -> Result<Vec<ContractorBidRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contractor_bids
             WHERE project_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ContractorBidRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Record a bid. A contractor bids at most once per project.
    pub async fn create(pool: &PgPool, input: &CreateContractorBid) -> Result<ContractorBidRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO contractor_bids (id, project_id, contractor_id, contractor_name, company, bid_amount)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractorBidRow>(&query)
            .bind(Uuid::now_v7())
            .bind(input.project_id)
            .bind(input.contractor_id)
            .bind(&input.contractor_name)
            .bind(&input.company)
            .bind(input.bid_amount)
            .fetch_one(pool)
            .await
    }

    /// Set the status of a contractor's bid. Returns `None` when no such bid.
    pub async fn update_status(
        pool: &PgPool,
        project_id: EntityId,
        contractor_id: EntityId,
        status: ContractorBidStatus,
    ) -> Result<Option<ContractorBidRow>, sqlx::Error> {
        let query = format!(
            "UPDATE contractor_bids SET status = $3
             WHERE project_id = $1 AND contractor_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractorBidRow>(&query)
            .bind(project_id)
            .bind(contractor_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
