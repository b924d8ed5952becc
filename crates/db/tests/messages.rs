//! Integration tests for messages and contractor bids.

use sqlx::PgPool;

use instabids_core::bid_card::{BidCardDetails, BidStatus, ContractorBidStatus, ListingStatus};
use instabids_core::messaging::{MessageAttachment, NewMessage};
use instabids_core::persistence::{BidCardStore, MessageStore};
use instabids_core::types::EntityId;
use instabids_db::models::contractor_bid::CreateContractorBid;
use instabids_db::repositories::ContractorBidRepo;
use instabids_db::PgStore;

async fn project(store: &PgStore) -> EntityId {
    let details = BidCardDetails {
        title: "Fence".into(),
        description: "Cedar fence, 40 ft".into(),
        job_type_id: None,
        job_category_id: None,
        property_type: None,
        service_type: None,
        status: ListingStatus::Published,
        bid_status: BidStatus::AcceptingBids,
        job_size: None,
        property_size: None,
        square_footage: None,
        zip_code: None,
        city: None,
        state: None,
        location: None,
        timeline_horizon_id: None,
        timeline_start: None,
        timeline_end: None,
        bid_deadline: None,
        budget_min: None,
        budget_max: None,
        group_bidding_enabled: false,
        terms_accepted: true,
        marketing_consent: None,
        owner_id: EntityId::from_u128(1),
    };
    BidCardStore::insert(store, &details, &[]).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_thread_is_scoped_and_ordered(pool: PgPool) {
    let store = PgStore::new(pool);
    let project_id = project(&store).await;
    let contractor = EntityId::from_u128(2);

    for (sender, content) in [(1, "Can you quote this?"), (2, "Sure, $4k"), (1, "Deal")] {
        MessageStore::insert(
            &store,
            &NewMessage {
                project_id,
                contractor_id: contractor,
                sender_id: EntityId::from_u128(sender),
                content: content.into(),
                attachments: vec![MessageAttachment {
                    filename: "plan.pdf".into(),
                    url: "https://media.example.com/plan.pdf".into(),
                    media_type: None,
                }],
                metadata: serde_json::json!({ "isFromContractor": sender == 2 }),
            },
        )
        .await
        .unwrap();
    }

    let thread = store.thread(project_id, contractor).await.unwrap();
    let contents: Vec<_> = thread.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Can you quote this?", "Sure, $4k", "Deal"]);
    assert_eq!(thread[1].metadata["isFromContractor"], true);
    assert_eq!(thread[0].attachments.len(), 1);

    assert!(store.thread(project_id, EntityId::from_u128(3)).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contractor_summaries(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let project_id = project(&store).await;
    let contractor_id = EntityId::from_u128(7);

    ContractorBidRepo::create(
        &pool,
        &CreateContractorBid {
            project_id,
            contractor_id,
            contractor_name: "Robin Carpenter".into(),
            company: Some("Robin & Co".into()),
            bid_amount: Some(4200.0),
        },
    )
    .await
    .unwrap();
    ContractorBidRepo::update_status(&pool, project_id, contractor_id, ContractorBidStatus::Accepted)
        .await
        .unwrap()
        .unwrap();

    let list = store.contractors(project_id).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, contractor_id);
    assert_eq!(list[0].status, ContractorBidStatus::Accepted);
}
