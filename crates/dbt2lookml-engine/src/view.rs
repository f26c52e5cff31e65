//! View generation
//!
//! Builds one LookML view per typed model: a dimension group for each
//! date or time column, a dimension for each scalar column and the
//! measures declared in column meta.

use crate::error::GenerateError;
use crate::lkml;
use crate::types::looker_type;
use dbt2lookml_core::{
    Diagnostic, DiagnosticCode, Dimension, DimensionGroup, Location, LookerType, LookmlFile,
    Measure, MeasureFilter, Severity, Timeframe, View,
};
use dbt2lookml_dbt::{MeasureMeta, SupportedAdapter, TypedColumn, TypedModel};

/// A built view and the findings collected while building it
#[derive(Debug, Clone)]
pub struct ViewBuild {
    pub view: View,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the view for a model
pub fn build_view(model: &TypedModel, adapter: SupportedAdapter) -> Result<ViewBuild, GenerateError> {
    let mut diagnostics = Vec::new();

    let typed: Vec<(&TypedColumn, Option<LookerType>)> = model
        .columns
        .iter()
        .map(|column| (column, resolve_type(model, column, adapter, &mut diagnostics)))
        .collect();

    let view = View {
        name: model.name.clone(),
        sql_table_name: model.relation_name.clone(),
        dimension_groups: dimension_groups(&typed, adapter),
        dimensions: dimensions(model, &typed),
        measures: measures(model)?,
    };

    tracing::debug!(
        "Created view from model {} with {} measures, {} dimensions",
        model.name,
        view.measures.len(),
        view.dimensions.len()
    );

    Ok(ViewBuild { view, diagnostics })
}

/// Build and serialize the view file for a model
pub fn view_file(
    model: &TypedModel,
    adapter: SupportedAdapter,
    use_file_path: bool,
) -> Result<(LookmlFile, Vec<Diagnostic>), GenerateError> {
    let ViewBuild { view, diagnostics } = build_view(model, adapter)?;

    let file = LookmlFile {
        directory: if use_file_path { model.directory() } else { String::new() },
        filename: format!("{}.view.lkml", model.name),
        contents: lkml::dump_view(&view),
    };

    Ok((file, diagnostics))
}

fn resolve_type(
    model: &TypedModel,
    column: &TypedColumn,
    adapter: SupportedAdapter,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<LookerType> {
    let column_type = column.data_type.as_deref().filter(|t| !t.is_empty())?;
    let mapped = looker_type(adapter, column_type);

    if mapped.is_none() {
        tracing::warn!(
            "Column type {} not supported for conversion from {} to looker. No dimension will be created.",
            column_type,
            adapter
        );
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::ColumnTypeUnsupported,
                Severity::Warn,
                format!("Column type {} not supported for conversion from {} to looker", column_type, adapter),
            )
            .with_location(Location::column(&model.unique_id, &column.name)),
        );
    }

    mapped
}

fn default_sql(column: &TypedColumn) -> String {
    format!("${{TABLE}}.{}", column.name)
}

/// Meta override, with an empty string meaning "not set"
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn dimension_name(column: &TypedColumn) -> String {
    non_empty(&column.meta.dimension.name).unwrap_or_else(|| column.name.clone())
}

fn dimension_sql(column: &TypedColumn, default: impl FnOnce() -> String) -> String {
    non_empty(&column.meta.dimension.sql).unwrap_or_else(default)
}

fn dimension_description(column: &TypedColumn) -> String {
    non_empty(&column.meta.dimension.description).unwrap_or_else(|| column.description.clone())
}

fn dimension_groups(
    typed: &[(&TypedColumn, Option<LookerType>)],
    adapter: SupportedAdapter,
) -> Vec<DimensionGroup> {
    let enabled = || typed.iter().filter(|(column, _)| column.meta.dimension.enabled);

    let date_times = enabled().filter_map(|(column, looker)| {
        let datatype = looker.filter(LookerType::is_date_time)?;
        Some(DimensionGroup {
            name: dimension_name(column),
            sql: dimension_sql(column, || date_time_sql(column, adapter)),
            description: dimension_description(column),
            datatype,
            timeframes: Timeframe::DATE_TIME.to_vec(),
        })
    });

    let dates = enabled().filter_map(|(column, looker)| {
        let datatype = looker.filter(|t| *t == LookerType::Date)?;
        Some(DimensionGroup {
            name: dimension_name(column),
            sql: dimension_sql(column, || default_sql(column)),
            description: dimension_description(column),
            datatype,
            timeframes: Timeframe::DATE.to_vec(),
        })
    });

    date_times.chain(dates).collect()
}

/// Looker cannot group Snowflake LTZ/TZ timestamps, so they are cast to NTZ
fn date_time_sql(column: &TypedColumn, adapter: SupportedAdapter) -> String {
    let zoned = column
        .data_type
        .as_deref()
        .map(|t| matches!(t.to_uppercase().as_str(), "TIMESTAMP_LTZ" | "TIMESTAMP_TZ"))
        .unwrap_or(false);

    if adapter == SupportedAdapter::Snowflake && zoned {
        tracing::debug!(
            "Snowflake TIMESTAMP_LTZ and TIMESTAMP_TZ are not supported by Looker. Casting {} to TIMESTAMP_NTZ",
            column.name
        );
        format!("CAST(${{TABLE}}.{}) AS TIMESTAMP_NTZ", column.name)
    } else {
        default_sql(column)
    }
}

fn dimensions(model: &TypedModel, typed: &[(&TypedColumn, Option<LookerType>)]) -> Vec<Dimension> {
    let mut dimensions = Vec::new();

    for (column, looker) in typed {
        let meta = &column.meta.dimension;
        if !meta.enabled {
            tracing::debug!("Dimension {} is disabled in model {}", column.name, model.name);
            continue;
        }

        let Some(looker_type) = looker.filter(LookerType::is_scalar) else {
            tracing::debug!("Column {} is not a scalar type, no dimension will be created.", column.name);
            continue;
        };

        dimensions.push(Dimension {
            name: dimension_name(column),
            looker_type,
            sql: dimension_sql(column, || default_sql(column)),
            description: dimension_description(column),
            value_format_name: meta.value_format_name.filter(|_| looker_type == LookerType::Number),
            primary_key: column.primary_key,
            hidden: meta.hidden,
        });
    }

    dimensions
}

fn measures(model: &TypedModel) -> Result<Vec<Measure>, GenerateError> {
    model
        .columns
        .iter()
        .flat_map(|column| {
            column
                .meta
                .all_measures()
                .into_iter()
                .map(move |(name, measure)| build_measure(model, column, name, measure))
        })
        .collect()
}

fn build_measure(
    model: &TypedModel,
    column: &TypedColumn,
    name: &str,
    measure: &MeasureMeta,
) -> Result<Measure, GenerateError> {
    let description = non_empty(&measure.description)
        .or_else(|| Some(column.description.clone()).filter(|d| !d.is_empty()))
        .unwrap_or_else(|| format!("{} of {}", measure.measure_type.capitalized(), column.name));

    Ok(Measure {
        name: name.to_string(),
        measure_type: measure.measure_type,
        sql: non_empty(&measure.sql).unwrap_or_else(|| default_sql(column)),
        description,
        filters: measure_filters(model, measure)?,
        value_format_name: measure.value_format_name,
        group_label: measure.group_label.clone(),
        label: measure.label.clone(),
        hidden: measure.hidden,
        drill_fields: measure.drill_fields.clone(),
    })
}

/// Filters are written against column names; LookML needs dimension names
fn measure_filters(model: &TypedModel, measure: &MeasureMeta) -> Result<Vec<MeasureFilter>, GenerateError> {
    measure
        .filters
        .iter()
        .flat_map(|filter| filter.iter())
        .map(|(column_name, expression)| -> Result<MeasureFilter, GenerateError> {
            let column = model.column(column_name).ok_or_else(|| GenerateError::UnknownFilterColumn {
                model: model.unique_id.clone(),
                column: column_name.clone(),
            })?;

            Ok(MeasureFilter {
                field: dimension_name(column),
                expression: expression.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbt2lookml_core::{Hidden, MeasureType, ValueFormatName};
    use dbt2lookml_dbt::ColumnMeta;
    use serde_json::json;

    fn column(name: &str, data_type: Option<&str>, meta: serde_json::Value) -> TypedColumn {
        TypedColumn {
            name: name.to_string(),
            description: String::new(),
            data_type: data_type.map(str::to_string),
            meta: ColumnMeta::from_value(&meta, name).unwrap(),
            primary_key: false,
            index: None,
        }
    }

    fn model(columns: Vec<TypedColumn>) -> TypedModel {
        TypedModel {
            unique_id: "model.shop.orders".to_string(),
            name: "orders".to_string(),
            relation_name: "ANALYTICS.SHOP.ORDERS".to_string(),
            schema: Some("SHOP".to_string()),
            path: "marts/finance/orders.sql".to_string(),
            description: String::new(),
            tags: vec![],
            columns,
            meta: Default::default(),
        }
    }

    #[test]
    fn snowflake_zoned_timestamps_are_cast() {
        let model = model(vec![
            column("placed_at", Some("TIMESTAMP_TZ"), serde_json::Value::Null),
            column("loaded_at", Some("TIMESTAMP_NTZ"), serde_json::Value::Null),
        ]);

        let build = build_view(&model, SupportedAdapter::Snowflake).unwrap();
        let groups = &build.view.dimension_groups;
        assert_eq!(groups[0].sql, "CAST(${TABLE}.placed_at) AS TIMESTAMP_NTZ");
        assert_eq!(groups[1].sql, "${TABLE}.loaded_at");
        assert_eq!(groups[0].timeframes.len(), 8);
    }

    #[test]
    fn date_time_groups_come_before_date_groups() {
        let model = model(vec![
            column("day", Some("DATE"), serde_json::Value::Null),
            column("at", Some("DATETIME"), serde_json::Value::Null),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        let names: Vec<_> = build.view.dimension_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["at", "day"]);
        assert_eq!(build.view.dimension_groups[1].timeframes, Timeframe::DATE.to_vec());
        assert!(build.view.dimensions.is_empty());
    }

    #[test]
    fn disabled_dimension_is_skipped_everywhere() {
        let model = model(vec![
            column("secret", Some("STRING"), json!({"dimension": {"enabled": false}})),
            column("day", Some("DATE"), json!({"dimension": {"enabled": false}})),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        assert!(build.view.dimensions.is_empty());
        assert!(build.view.dimension_groups.is_empty());
    }

    #[test]
    fn empty_overrides_fall_back_to_defaults() {
        let mut status = column("status", Some("STRING"), json!({
            "dimension": {"name": "", "description": "", "sql": ""},
            "measures": {"n": {"type": "count", "sql": "", "description": ""}}
        }));
        status.description = "Order status".to_string();
        let placed = column("placed_at", Some("TIMESTAMP"), json!({"dimension": {"name": "", "sql": ""}}));

        let build = build_view(&model(vec![status, placed]), SupportedAdapter::BigQuery).unwrap();

        let dimension = &build.view.dimensions[0];
        assert_eq!(dimension.name, "status");
        assert_eq!(dimension.sql, "${TABLE}.status");
        assert_eq!(dimension.description, "Order status");

        let group = &build.view.dimension_groups[0];
        assert_eq!(group.name, "placed_at");
        assert_eq!(group.sql, "${TABLE}.placed_at");

        let measure = &build.view.measures[0];
        assert_eq!(measure.sql, "${TABLE}.status");
        assert_eq!(measure.description, "Order status");

        let text = lkml::dump_view(&build.view);
        assert!(!text.contains("dimension:  {"));
        assert!(!text.contains("sql:  ;;"));
    }

    #[test]
    fn value_format_only_applies_to_numbers() {
        let model = model(vec![
            column("amount", Some("NUMERIC"), json!({"dimension": {"value_format_name": "usd"}})),
            column("code", Some("STRING"), json!({"dimension": {"value_format_name": "usd"}})),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        assert_eq!(build.view.dimensions[0].value_format_name, Some(ValueFormatName::Usd));
        assert_eq!(build.view.dimensions[1].value_format_name, None);
    }

    #[test]
    fn unsupported_type_produces_diagnostic() {
        let model = model(vec![
            column("payload", Some("JSON"), serde_json::Value::Null),
            column("untyped", None, serde_json::Value::Null),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        assert!(build.view.dimensions.is_empty());
        assert_eq!(build.diagnostics.len(), 1);
        assert_eq!(build.diagnostics[0].code, DiagnosticCode::ColumnTypeUnsupported);
    }

    #[test]
    fn measure_defaults_and_overrides() {
        let model = model(vec![
            column("amount", Some("NUMERIC"), json!({
                "measures": {"total": {"type": "sum"}},
                "metric": {"largest": {"type": "max", "sql": "${amount}", "description": "Biggest", "hidden": "yes"}}
            })),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        let measures = &build.view.measures;
        assert_eq!(measures.len(), 2);

        assert_eq!(measures[0].name, "largest");
        assert_eq!(measures[0].sql, "${amount}");
        assert_eq!(measures[0].description, "Biggest");
        assert_eq!(measures[0].hidden, Some(Hidden::Yes));

        assert_eq!(measures[1].name, "total");
        assert_eq!(measures[1].measure_type, MeasureType::Sum);
        assert_eq!(measures[1].sql, "${TABLE}.amount");
        assert_eq!(measures[1].description, "Sum of amount");
    }

    #[test]
    fn filters_use_dimension_names() {
        let model = model(vec![
            column("status", Some("STRING"), json!({"dimension": {"name": "order_status"}})),
            column("id", Some("INT64"), json!({
                "measures": {"completed": {"type": "count", "filters": [{"Status": "completed"}]}}
            })),
        ]);

        let build = build_view(&model, SupportedAdapter::BigQuery).unwrap();
        let filter = &build.view.measures[0].filters[0];
        assert_eq!(filter.field, "order_status");
        assert_eq!(filter.expression, "completed");
    }

    #[test]
    fn filter_on_unknown_column_fails() {
        let model = model(vec![column(
            "id",
            Some("INT64"),
            json!({"measures": {"n": {"type": "count", "filters": [{"missing": "x"}]}}}),
        )]);

        let err = build_view(&model, SupportedAdapter::BigQuery).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownFilterColumn { ref column, .. } if column == "missing"));
    }

    #[test]
    fn view_file_directory_follows_flag() {
        let model = model(vec![column("id", Some("INT64"), serde_json::Value::Null)]);

        let (flat, _) = view_file(&model, SupportedAdapter::BigQuery, false).unwrap();
        assert_eq!(flat.directory, "");
        assert_eq!(flat.filename, "orders.view.lkml");

        let (nested, _) = view_file(&model, SupportedAdapter::BigQuery, true).unwrap();
        assert_eq!(nested.directory, "marts/finance");
    }
}
