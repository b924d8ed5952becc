use sqlx::PgPool;

/// Connect, migrate, and verify the schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    instabids_db::health_check(&pool).await.unwrap();

    for table in ["bid_cards", "bid_card_media", "contractor_bids", "messages"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
