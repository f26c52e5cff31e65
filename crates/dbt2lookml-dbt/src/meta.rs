//! dbt2looker `meta` blocks
//!
//! Models and columns carry LookML hints in their dbt `meta`:
//!
//! ```yaml
//! columns:
//!   - name: amount
//!     meta:
//!       dimension:
//!         hidden: true
//!       measures:
//!         total_amount:
//!           type: sum
//!           filters:
//!             - status: "completed"
//! ```
//!
//! The manifest keeps `meta` as raw JSON; this module validates it into
//! typed structures. Unrelated keys in `meta` are ignored.

use dbt2lookml_core::{Hidden, JoinRelationship, JoinType, MeasureType, ValueFormatName};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Column-level meta
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnMeta {
    #[serde(default)]
    pub measures: BTreeMap<String, MeasureMeta>,

    #[serde(default)]
    pub measure: BTreeMap<String, MeasureMeta>,

    #[serde(default)]
    pub metrics: BTreeMap<String, MeasureMeta>,

    #[serde(default)]
    pub metric: BTreeMap<String, MeasureMeta>,

    #[serde(default)]
    pub dimension: DimensionMeta,
}

impl ColumnMeta {
    /// Validate a raw `meta` value; `location` names the column in errors
    pub fn from_value(value: &serde_json::Value, location: &str) -> Result<Self, MetaError> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let meta: ColumnMeta = serde_json::from_value(value.clone()).map_err(|e| MetaError::Invalid {
            location: location.to_string(),
            message: e.to_string(),
        })?;

        for measure in meta.all_measures().values() {
            measure.validate(location)?;
        }

        Ok(meta)
    }

    /// All measures declared under any of the four accepted keys
    ///
    /// Keys are merged in the order measures, measure, metrics, metric; a
    /// later key wins on name clashes.
    pub fn all_measures(&self) -> BTreeMap<&str, &MeasureMeta> {
        [&self.measures, &self.measure, &self.metrics, &self.metric]
            .into_iter()
            .flat_map(|map| map.iter())
            .map(|(name, measure)| (name.as_str(), measure))
            .collect()
    }

    /// Number of measures after merging
    pub fn measure_count(&self) -> usize {
        self.all_measures().len()
    }
}

/// Dimension overrides for a column
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DimensionMeta {
    /// Set to false to skip generating a dimension for the column
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub sql: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Only honored for number dimensions
    #[serde(default)]
    pub value_format_name: Option<ValueFormatName>,

    #[serde(default, deserialize_with = "yes_no")]
    pub hidden: bool,
}

impl Default for DimensionMeta {
    fn default() -> Self {
        Self {
            enabled: true,
            name: None,
            sql: None,
            description: None,
            value_format_name: None,
            hidden: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A measure declared on a column
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasureMeta {
    #[serde(rename = "type")]
    pub measure_type: MeasureType,

    /// Each entry maps exactly one column name to a Looker filter expression
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filters: Vec<BTreeMap<String, String>>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub sql: Option<String>,

    #[serde(default)]
    pub value_format_name: Option<ValueFormatName>,

    #[serde(default)]
    pub group_label: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "hidden_flag")]
    pub hidden: Option<Hidden>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub drill_fields: Vec<String>,
}

impl MeasureMeta {
    fn validate(&self, location: &str) -> Result<(), MetaError> {
        if self.filters.iter().any(|filter| filter.len() != 1) {
            return Err(MetaError::MultipleFilterNames(location.to_string()));
        }
        Ok(())
    }
}

/// Model-level meta
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelMeta {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub joins: Vec<JoinMeta>,
}

impl ModelMeta {
    /// Validate a raw `meta` value; `location` names the model in errors
    pub fn from_value(value: &serde_json::Value, location: &str) -> Result<Self, MetaError> {
        if value.is_null() {
            return Ok(Self::default());
        }

        serde_json::from_value(value.clone()).map_err(|e| MetaError::Invalid {
            location: location.to_string(),
            message: e.to_string(),
        })
    }
}

/// An explore join declared on a model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinMeta {
    /// Name of the joined view
    pub join: String,

    #[serde(rename = "type", default)]
    pub join_type: JoinType,

    #[serde(default)]
    pub relationship: JoinRelationship,

    pub sql_on: String,

    /// Defaults to the joined view name
    #[serde(default)]
    pub view_label: Option<String>,
}

/// YAML 1.1 loaders turn `yes`/`no` into booleans; accept both spellings.
#[derive(Deserialize)]
#[serde(untagged)]
enum YesNo {
    Flag(bool),
    Word(Hidden),
}

fn yes_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<YesNo>::deserialize(deserializer)? {
        Some(YesNo::Flag(flag)) => flag,
        Some(YesNo::Word(word)) => word == Hidden::Yes,
        None => false,
    })
}

fn hidden_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hidden>, D::Error> {
    Ok(Option::<YesNo>::deserialize(deserializer)?.map(|value| match value {
        YesNo::Flag(true) => Hidden::Yes,
        YesNo::Flag(false) => Hidden::No,
        YesNo::Word(word) => word,
    }))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// meta validation errors
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("Invalid dbt2looker meta on {location}: {message}")]
    Invalid { location: String, message: String },

    #[error("Multiple filter names provided for a single filter in measure block on {0}")]
    MultipleFilterNames(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_meta_is_empty() {
        let meta = ColumnMeta::from_value(&serde_json::Value::Null, "orders.id").unwrap();
        assert_eq!(meta, ColumnMeta::default());
        assert!(meta.dimension.enabled);
    }

    #[test]
    fn measures_merge_across_keys() {
        let meta = ColumnMeta::from_value(
            &json!({
                "measures": {"total": {"type": "sum"}, "shared": {"type": "min"}},
                "metric": {"shared": {"type": "max"}, "avg": {"type": "average"}},
                "owner": "finance-team"
            }),
            "orders.amount",
        )
        .unwrap();

        let merged = meta.all_measures();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["shared"].measure_type, MeasureType::Max);
        assert_eq!(meta.measure_count(), 3);
    }

    #[test]
    fn filter_with_two_columns_is_rejected() {
        let err = ColumnMeta::from_value(
            &json!({"measures": {"n": {"type": "count", "filters": [{"a": "1", "b": "2"}]}}}),
            "orders.id",
        )
        .unwrap_err();

        assert!(matches!(err, MetaError::MultipleFilterNames(_)));
        assert!(err.to_string().contains("orders.id"));
    }

    #[test]
    fn unknown_measure_type_names_location() {
        let err = ColumnMeta::from_value(
            &json!({"measures": {"p90": {"type": "percentile"}}}),
            "orders.amount",
        )
        .unwrap_err();

        assert!(err.to_string().contains("orders.amount"));
    }

    #[test]
    fn hidden_accepts_bool_and_word() {
        let meta = ColumnMeta::from_value(
            &json!({
                "dimension": {"hidden": true},
                "measures": {"a": {"type": "count", "hidden": "yes"}, "b": {"type": "count", "hidden": false}}
            }),
            "orders.id",
        )
        .unwrap();

        assert!(meta.dimension.hidden);
        assert_eq!(meta.measures["a"].hidden, Some(Hidden::Yes));
        assert_eq!(meta.measures["b"].hidden, Some(Hidden::No));
    }

    #[test]
    fn join_defaults() {
        let meta = ModelMeta::from_value(
            &json!({"joins": [{"join": "customers", "sql_on": "${orders.customer_id} = ${customers.id}"}]}),
            "model.shop.orders",
        )
        .unwrap();

        let join = &meta.joins[0];
        assert_eq!(join.join_type, JoinType::LeftOuter);
        assert_eq!(join.relationship, JoinRelationship::ManyToOne);
        assert!(join.view_label.is_none());
    }

    #[test]
    fn join_without_sql_on_is_rejected() {
        let result = ModelMeta::from_value(&json!({"joins": [{"join": "customers"}]}), "model.shop.orders");
        assert!(result.is_err());
    }
}
