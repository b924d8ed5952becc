//! Generic table access for the admin passthrough.
//!
//! Table and column names arrive pre-validated as [`Identifier`]s and are
//! spliced into SQL quoted. Row values are always bound: records go through
//! `jsonb_populate_record` so Postgres applies the column types, and
//! filters match with `to_jsonb(row) @> filters`.

use serde_json::{Map, Value};
use sqlx::PgPool;

use instabids_core::admin::{Identifier, TableDefinition, TableQuery};

pub struct AdminTableRepo;

impl AdminTableRepo {
    /// Insert one record, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        table: &Identifier,
        data: &Map<String, Value>,
    ) -> Result<Value, sqlx::Error> {
        let query = insert_sql(table, data);
        let (row,): (Value,) = sqlx::query_as(&query)
            .bind(Value::Object(data.clone()))
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    /// Update rows matching `filters`, returning the updated rows.
    pub async fn update(
        pool: &PgPool,
        table: &Identifier,
        data: &Map<String, Value>,
        filters: &Map<String, Value>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let query = update_sql(table, data);
        let rows: Vec<(Value,)> = sqlx::query_as(&query)
            .bind(Value::Object(data.clone()))
            .bind(Value::Object(filters.clone()))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// Delete rows matching `filters`, returning the deleted rows.
    pub async fn delete(
        pool: &PgPool,
        table: &Identifier,
        filters: &Map<String, Value>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let query = delete_sql(table);
        let rows: Vec<(Value,)> = sqlx::query_as(&query)
            .bind(Value::Object(filters.clone()))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    pub async fn create_table(pool: &PgPool, definition: &TableDefinition) -> Result<(), sqlx::Error> {
        sqlx::query(&create_table_sql(definition)).execute(pool).await?;
        Ok(())
    }

    pub async fn select(pool: &PgPool, query: &TableQuery) -> Result<Vec<Value>, sqlx::Error> {
        let sql = select_sql(query);
        let rows: Vec<(Value,)> = sqlx::query_as(&sql)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }
}

// ---------------------------------------------------------------------------
// SQL builders
// ---------------------------------------------------------------------------

fn quoted_keys(data: &Map<String, Value>) -> Vec<String> {
    // Keys were checked with `Identifier::parse` by the caller.
    data.keys().map(|k| format!("\"{k}\"")).collect()
}

fn insert_sql(table: &Identifier, data: &Map<String, Value>) -> String {
    let cols = quoted_keys(data).join(", ");
    let t = table.quoted();
    format!(
        "INSERT INTO {t} AS x ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{t}, $1) \
         RETURNING to_jsonb(x.*)"
    )
}

fn update_sql(table: &Identifier, data: &Map<String, Value>) -> String {
    let assignments = quoted_keys(data)
        .iter()
        .map(|c| format!("{c} = r.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let t = table.quoted();
    format!(
        "UPDATE {t} AS x SET {assignments} \
         FROM jsonb_populate_record(NULL::{t}, $1) AS r \
         WHERE to_jsonb(x.*) @> $2 \
         RETURNING to_jsonb(x.*)"
    )
}

fn delete_sql(table: &Identifier) -> String {
    format!(
        "DELETE FROM {} AS x WHERE to_jsonb(x.*) @> $1 RETURNING to_jsonb(x.*)",
        table.quoted()
    )
}

fn create_table_sql(def: &TableDefinition) -> String {
    let mut parts: Vec<String> = def
        .columns
        .iter()
        .map(|c| {
            let mut col = format!("{} {}", c.name.quoted(), c.column_type.sql());
            if !c.nullable {
                col.push_str(" NOT NULL");
            }
            if c.unique && !c.primary_key {
                col.push_str(" UNIQUE");
            }
            col
        })
        .collect();

    let pk = def.primary_key();
    if !pk.is_empty() {
        let cols = pk.iter().map(|c| c.quoted()).collect::<Vec<_>>().join(", ");
        parts.push(format!("PRIMARY KEY ({cols})"));
    }
    format!("CREATE TABLE {} ({})", def.name.quoted(), parts.join(", "))
}

fn select_sql(query: &TableQuery) -> String {
    let projection = if query.columns.is_empty() {
        "to_jsonb(x.*)".to_string()
    } else {
        let pairs = query
            .columns
            .iter()
            .map(|c| format!("'{}', x.{}", c.as_str(), c.quoted()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("jsonb_build_object({pairs})")
    };
    let order = match &query.order_by {
        Some(o) => format!(
            " ORDER BY x.{} {}",
            o.column.quoted(),
            if o.descending { "DESC" } else { "ASC" }
        ),
        None => String::new(),
    };
    format!(
        "SELECT {projection} FROM {} AS x{order} LIMIT $1 OFFSET $2",
        query.table.quoted()
    )
}
