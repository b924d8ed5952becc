//! Input rules for the admin database passthrough.
//!
//! The admin UI addresses tables and columns by name, so every name is
//! checked against a strict identifier pattern before it reaches SQL, and
//! column types are limited to an allow-list.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Rows returned when `limit` is absent.
pub const DEFAULT_ROW_LIMIT: i64 = 100;

/// Upper bound on rows returned by one select.
pub const MAX_ROW_LIMIT: i64 = 1000;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("valid regex"));

/// Prefixes owned by PostgreSQL or the migration runner.
const RESERVED_PREFIXES: &[&str] = &["pg_", "_sqlx"];

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A table or column name that is safe to splice into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `raw` as an identifier. `what` names it in the error.
    pub fn parse(what: &str, raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if !IDENT_RE.is_match(raw) {
            return Err(CoreError::Validation(format!(
                "Invalid {what} '{raw}'. Use lowercase letters, digits and underscores"
            )));
        }
        if RESERVED_PREFIXES.iter().any(|p| raw.starts_with(p)) {
            return Err(CoreError::Validation(format!(
                "{what} '{raw}' uses a reserved prefix"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for SQL.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a required table name.
pub fn require_table(table: Option<&str>) -> Result<Identifier, CoreError> {
    match table.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => Identifier::parse("table name", t),
        None => Err(CoreError::Validation("Missing required parameter 'table'".into())),
    }
}

// ---------------------------------------------------------------------------
// Column types
// ---------------------------------------------------------------------------

/// Column types the admin UI may create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    BigInt,
    Boolean,
    Double,
    Timestamptz,
    Date,
    Uuid,
    Jsonb,
    Serial,
    BigSerial,
}

impl ColumnType {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "varchar" | "string" => Ok(Self::Text),
            "integer" | "int" | "int4" => Ok(Self::Integer),
            "bigint" | "int8" => Ok(Self::BigInt),
            "boolean" | "bool" => Ok(Self::Boolean),
            "double" | "double precision" | "float8" | "numeric" => Ok(Self::Double),
            "timestamptz" | "timestamp" => Ok(Self::Timestamptz),
            "date" => Ok(Self::Date),
            "uuid" => Ok(Self::Uuid),
            "jsonb" | "json" => Ok(Self::Jsonb),
            "serial" => Ok(Self::Serial),
            "bigserial" => Ok(Self::BigSerial),
            other => Err(CoreError::Validation(format!(
                "Unsupported column type '{other}'"
            ))),
        }
    }

    /// PostgreSQL type name.
    pub fn sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Boolean => "BOOLEAN",
            Self::Double => "DOUBLE PRECISION",
            Self::Timestamptz => "TIMESTAMPTZ",
            Self::Date => "DATE",
            Self::Uuid => "UUID",
            Self::Jsonb => "JSONB",
            Self::Serial => "SERIAL",
            Self::BigSerial => "BIGSERIAL",
        }
    }
}

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// A column as sent by the admin UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: Identifier,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
}

/// A validated `CREATE TABLE` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: Identifier,
    pub columns: Vec<ColumnSpec>,
}

impl TableDefinition {
    pub fn parse(table_name: Option<&str>, columns: &[ColumnDefinition]) -> Result<Self, CoreError> {
        let name = match table_name.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Identifier::parse("table name", t)?,
            None => {
                return Err(CoreError::Validation(
                    "Missing required parameter 'tableName'".into(),
                ))
            }
        };
        if columns.is_empty() {
            return Err(CoreError::Validation(
                "Missing required parameter 'columns'".into(),
            ));
        }

        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(columns.len());
        for col in columns {
            let col_name = Identifier::parse("column name", &col.name)?;
            if !seen.insert(col_name.clone()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate column '{col_name}'"
                )));
            }
            specs.push(ColumnSpec {
                name: col_name,
                column_type: ColumnType::from_name(&col.data_type)?,
                nullable: col.nullable && !col.primary_key,
                primary_key: col.primary_key,
                unique: col.unique,
            });
        }

        Ok(Self {
            name,
            columns: specs,
        })
    }

    pub fn primary_key(&self) -> Vec<&Identifier> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| &c.name)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Records and filters
// ---------------------------------------------------------------------------

/// Validate a JSON object whose keys are column names.
///
/// `what` is the request field (`data` or `filters`) used in errors.
pub fn require_columns_object(what: &str, value: Option<&Value>) -> Result<Map<String, Value>, CoreError> {
    let obj = match value {
        Some(Value::Object(obj)) if !obj.is_empty() => obj,
        Some(Value::Object(_)) | None | Some(Value::Null) => {
            return Err(CoreError::Validation(format!(
                "Missing required parameter '{what}'"
            )))
        }
        Some(_) => {
            return Err(CoreError::Validation(format!(
                "'{what}' must be a JSON object"
            )))
        }
    };
    for key in obj.keys() {
        Identifier::parse("column name", key)?;
    }
    Ok(obj.clone())
}

// ---------------------------------------------------------------------------
// Select queries
// ---------------------------------------------------------------------------

/// `ORDER BY` clause parsed from `column`, `column.asc` or `column.desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Identifier,
    pub descending: bool,
}

impl OrderBy {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let (column, descending) = match raw.rsplit_once('.') {
            Some((col, "desc")) => (col, true),
            Some((col, "asc")) => (col, false),
            Some((_, dir)) => {
                return Err(CoreError::Validation(format!(
                    "Invalid sort direction '{dir}'. Use asc or desc"
                )))
            }
            None => (raw, false),
        };
        Ok(Self {
            column: Identifier::parse("orderBy column", column)?,
            descending,
        })
    }
}

/// A validated select against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: Identifier,
    /// Empty means every column.
    pub columns: Vec<Identifier>,
    pub limit: i64,
    pub offset: i64,
    pub order_by: Option<OrderBy>,
}

impl TableQuery {
    pub fn parse(
        name: Option<&str>,
        columns: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
        order_by: Option<&str>,
    ) -> Result<Self, CoreError> {
        let table = match name.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Identifier::parse("table name", t)?,
            None => return Err(CoreError::Validation("Missing required parameter 'name'".into())),
        };

        let columns = match columns.map(str::trim) {
            None | Some("") | Some("*") => Vec::new(),
            Some(list) => list
                .split(',')
                .map(|c| Identifier::parse("column name", c))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let order_by = match order_by.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) => Some(OrderBy::parse(o)?),
            None => None,
        };

        Ok(Self {
            table,
            columns,
            limit: crate::pagination::clamp_limit(limit, DEFAULT_ROW_LIMIT, MAX_ROW_LIMIT),
            offset: crate::pagination::clamp_offset(offset),
            order_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn identifiers_accept_snake_case() {
        assert_eq!(Identifier::parse("table", "bid_cards").unwrap().as_str(), "bid_cards");
        assert_eq!(Identifier::parse("table", "_tmp2").unwrap().quoted(), "\"_tmp2\"");
    }

    #[test]
    fn identifiers_reject_injection_and_reserved_names() {
        for bad in ["users; DROP TABLE x", "Users", "1abc", "a-b", "", "pg_class", "_sqlx_migrations"] {
            assert_matches!(Identifier::parse("table", bad), Err(CoreError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn missing_table_is_reported() {
        assert_matches!(require_table(None), Err(CoreError::Validation(msg)) if msg.contains("table"));
        assert_matches!(require_table(Some("  ")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn column_types_map_to_sql() {
        assert_eq!(ColumnType::from_name("varchar").unwrap().sql(), "TEXT");
        assert_eq!(ColumnType::from_name("JSON").unwrap(), ColumnType::Jsonb);
        assert!(ColumnType::from_name("money").is_err());
    }

    #[test]
    fn table_definition_rejects_duplicates_and_empty() {
        let cols = vec![
            ColumnDefinition {
                name: "id".into(),
                data_type: "uuid".into(),
                nullable: true,
                primary_key: true,
                unique: false,
            },
            ColumnDefinition {
                name: "id".into(),
                data_type: "text".into(),
                nullable: true,
                primary_key: false,
                unique: false,
            },
        ];
        assert_matches!(TableDefinition::parse(Some("things"), &cols), Err(CoreError::Validation(msg)) if msg.contains("Duplicate"));
        assert_matches!(TableDefinition::parse(Some("things"), &[]), Err(CoreError::Validation(_)));
        assert_matches!(TableDefinition::parse(None, &cols[..1]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn primary_key_columns_are_not_nullable() {
        let cols: Vec<ColumnDefinition> = serde_json::from_value(json!([
            { "name": "id", "type": "bigserial", "primaryKey": true },
            { "name": "label", "type": "text" }
        ]))
        .unwrap();
        let def = TableDefinition::parse(Some("labels"), &cols).unwrap();
        assert!(!def.columns[0].nullable);
        assert!(def.columns[1].nullable);
        assert_eq!(def.primary_key().len(), 1);
    }

    #[test]
    fn columns_object_requires_non_empty_object() {
        assert_matches!(require_columns_object("filters", None), Err(_));
        assert_matches!(require_columns_object("filters", Some(&json!({}))), Err(_));
        assert_matches!(require_columns_object("filters", Some(&json!([1]))), Err(_));
        assert_matches!(
            require_columns_object("data", Some(&json!({ "bad name": 1 }))),
            Err(CoreError::Validation(_))
        );
        let obj = require_columns_object("data", Some(&json!({ "title": "x" }))).unwrap();
        assert_eq!(obj["title"], "x");
    }

    #[test]
    fn order_by_parsing() {
        let o = OrderBy::parse("created_at.desc").unwrap();
        assert_eq!(o.column.as_str(), "created_at");
        assert!(o.descending);
        assert!(!OrderBy::parse("title").unwrap().descending);
        assert!(OrderBy::parse("title.sideways").is_err());
    }

    #[test]
    fn table_query_defaults_and_clamps() {
        let q = TableQuery::parse(Some("bid_cards"), None, None, Some(-4), None).unwrap();
        assert!(q.columns.is_empty());
        assert_eq!(q.limit, DEFAULT_ROW_LIMIT);
        assert_eq!(q.offset, 0);

        let q = TableQuery::parse(Some("bid_cards"), Some("id, title"), Some(50_000), None, Some("title.asc"))
            .unwrap();
        assert_eq!(q.columns.len(), 2);
        assert_eq!(q.limit, MAX_ROW_LIMIT);
        assert!(q.order_by.is_some());

        assert!(TableQuery::parse(None, None, None, None, None).is_err());
    }
}
