//! Integration tests against the mini dbt project fixture

use dbt2lookml_core::{DiagnosticCode, Severity};
use dbt2lookml_dbt::{parse_typed_models, Catalog, DbtProjectConfig, Manifest, SupportedAdapter};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/mini-dbt-project")
        .join(relative)
}

fn load() -> (Manifest, Catalog) {
    let manifest = Manifest::from_file(&fixture("target/manifest.json")).unwrap();
    let catalog = Catalog::from_file(&fixture("target/catalog.json")).unwrap();
    (manifest, catalog)
}

#[test]
fn project_name_is_read_from_yaml() {
    let project = DbtProjectConfig::from_file(&fixture("dbt_project.yml")).unwrap();
    assert_eq!(project.name, "jaffle_shop");
}

#[test]
fn fixture_manifest_metadata() {
    let (manifest, _) = load();
    assert_eq!(manifest.adapter().unwrap(), SupportedAdapter::BigQuery);
    assert_eq!(manifest.metadata.dbt_version.as_deref(), Some("1.7.4"));
    assert_eq!(manifest.models().count(), 4);
}

#[test]
fn typed_models_from_fixture() {
    let (manifest, catalog) = load();
    let parsed = parse_typed_models(&manifest, &catalog, None).unwrap();

    let names: Vec<_> = parsed.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders"]);
    assert_eq!(parsed.skipped, 1);

    let missing = &parsed.diagnostics[0];
    assert_eq!(missing.code, DiagnosticCode::ModelMissingFromCatalog);
    assert_eq!(missing.severity, Severity::Warn);
    assert_eq!(
        missing.location.as_ref().map(|l| l.model.as_str()),
        Some("model.jaffle_shop.legacy_orders")
    );

    let orders = &parsed.models[1];
    let columns: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        columns,
        vec![
            "order_id",
            "customer_id",
            "status",
            "amount",
            "is_returned",
            "ordered_at",
            "shipped_date",
            "internal_note",
            "payload",
        ]
    );
    assert_eq!(orders.column("status").unwrap().data_type.as_deref(), Some("STRING"));
    assert!(orders.column("order_id").unwrap().primary_key);
    assert_eq!(orders.measure_count(), 3);
    assert_eq!(orders.meta.joins.len(), 1);
    assert!(orders.has_tag("explore"));
}

#[test]
fn tag_filter_on_fixture() {
    let (manifest, catalog) = load();

    let parsed = parse_typed_models(&manifest, &catalog, Some("explore")).unwrap();
    assert_eq!(parsed.models.len(), 1);
    assert_eq!(parsed.models[0].name, "orders");
    assert_eq!(parsed.skipped, 0);

    let parsed = parse_typed_models(&manifest, &catalog, Some("nothing-tagged")).unwrap();
    assert!(parsed.models.is_empty());
}
