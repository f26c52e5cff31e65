//! Warehouse type to LookML type mapping
//!
//! One table per supported adapter. Types missing from a table are not
//! supported and produce no field.

use dbt2lookml_core::LookerType;
use dbt2lookml_dbt::SupportedAdapter;
use regex::Regex;
use std::sync::OnceLock;

use dbt2lookml_core::LookerType::{Date, Datetime, Number, String as Text, Timestamp, Yesno};

/// Map a warehouse column type to a LookML type
///
/// Returns None for a missing type and for types with no mapping; callers
/// decide whether an unmapped type is worth reporting.
pub fn looker_type(adapter: SupportedAdapter, column_type: &str) -> Option<LookerType> {
    if column_type.is_empty() {
        return None;
    }

    let normalized = match adapter {
        SupportedAdapter::Spark => strip_parameters(column_type),
        _ => column_type,
    }
    .to_uppercase();

    match adapter {
        SupportedAdapter::BigQuery => bigquery(&normalized),
        SupportedAdapter::Snowflake => snowflake(&normalized),
        SupportedAdapter::Redshift => redshift(&normalized),
        SupportedAdapter::Postgres => postgres(&normalized),
        SupportedAdapter::Spark => spark(&normalized),
    }
}

/// Drop a parameter list, e.g. `decimal(10,2)` becomes `decimal`
fn strip_parameters(column_type: &str) -> &str {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| Regex::new(r"^[^(]*").expect("static regex"));
    re.find(column_type).map_or(column_type, |m| m.as_str())
}

fn bigquery(column_type: &str) -> Option<LookerType> {
    Some(match column_type {
        "INT64" | "INTEGER" | "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => Number,
        "BOOLEAN" | "BOOL" => Yesno,
        "STRING" => Text,
        "TIMESTAMP" => Timestamp,
        "DATETIME" => Datetime,
        "DATE" => Date,
        // time-of-day has no dimension_group equivalent
        "TIME" => Text,
        "ARRAY" | "GEOGRAPHY" | "BYTES" => Text,
        _ => return None,
    })
}

fn snowflake(column_type: &str) -> Option<LookerType> {
    Some(match column_type {
        "NUMBER" | "DECIMAL" | "NUMERIC" | "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "FLOAT"
        | "FLOAT4" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" | "REAL" => Number,
        "VARCHAR" | "CHAR" | "CHARACTER" | "STRING" | "TEXT" | "BINARY" | "VARBINARY" => Text,
        "BOOLEAN" => Yesno,
        "DATE" => Date,
        "DATETIME" => Datetime,
        "TIME" => Text,
        // LTZ and TZ are cast to NTZ in the generated SQL
        "TIMESTAMP" | "TIMESTAMP_NTZ" | "TIMESTAMP_LTZ" | "TIMESTAMP_TZ" => Timestamp,
        "VARIANT" | "OBJECT" | "ARRAY" | "GEOGRAPHY" => Text,
        _ => return None,
    })
}

fn redshift(column_type: &str) -> Option<LookerType> {
    Some(match column_type {
        "SMALLINT" | "INT2" | "INTEGER" | "INT" | "INT4" | "BIGINT" | "INT8" | "DECIMAL"
        | "NUMERIC" | "REAL" | "FLOAT4" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT" => Number,
        "BOOLEAN" | "BOOL" => Yesno,
        "CHAR" | "CHARACTER" | "NCHAR" | "BPCHAR" | "VARCHAR" | "CHARACTER VARYING"
        | "NVARCHAR" | "TEXT" => Text,
        "DATE" => Date,
        // time zone aware timestamps are not supported
        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => Timestamp,
        "GEOMETRY" | "TIME" | "TIME WITHOUT TIME ZONE" => Text,
        _ => return None,
    })
}

fn postgres(column_type: &str) -> Option<LookerType> {
    Some(match column_type {
        "XML" | "UUID" | "PG_LSN" | "MACADDR" | "JSON" | "JSONB" | "CIDR" | "INET" => Text,
        "MONEY" | "SMALLINT" | "INT2" | "SMALLSERIAL" | "SERIAL2" | "INTEGER" | "INT" | "INT4"
        | "SERIAL" | "SERIAL4" | "BIGINT" | "INT8" | "BIGSERIAL" | "SERIAL8" | "DECIMAL"
        | "NUMERIC" | "REAL" | "FLOAT4" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT" => Number,
        "BOOLEAN" | "BOOL" => Yesno,
        "CHAR" | "CHARACTER" | "NCHAR" | "BPCHAR" | "VARCHAR" | "CHARACTER VARYING"
        | "NVARCHAR" | "TEXT" | "STRING" => Text,
        "DATE" => Date,
        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => Timestamp,
        "GEOMETRY" | "TIME" | "TIME WITHOUT TIME ZONE" => Text,
        _ => return None,
    })
}

fn spark(column_type: &str) -> Option<LookerType> {
    Some(match column_type {
        "BYTE" | "SHORT" | "INTEGER" | "LONG" | "FLOAT" | "DOUBLE" | "DECIMAL" => Number,
        "STRING" | "VARCHAR" | "CHAR" => Text,
        "BOOLEAN" => Yesno,
        "TIMESTAMP" => Timestamp,
        "DATE" => Datetime,
        _ => return None,
    })
}
