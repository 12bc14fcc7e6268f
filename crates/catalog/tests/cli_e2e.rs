#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use catalogapp::api::CatalogApi;
use catalogapp::attributes::{
    AttributeDefinition, DataType, InheritanceStrategy, ValidationRules,
};
use catalogapp::config::CatalogConfig;
use catalogapp::model::{Channel, Product, Variant};
use catalogapp::store::fs::FileStore;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A data dir with a blind product, two variants and three attributes.
fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut api = CatalogApi::new(
        FileStore::new(dir.path().to_path_buf()),
        CatalogConfig::default(),
    );
    api.define_attribute(
        &AttributeDefinition::new("light_filtering", DataType::Enum)
            .with_enum_values(["Blackout", "Sheer"])
            .inheritable(InheritanceStrategy::Always),
    )
    .unwrap();
    api.define_attribute(
        &AttributeDefinition::new("warranty_years", DataType::Number)
            .with_rules(ValidationRules {
                min: Some(0.0),
                ..Default::default()
            })
            .inheritable(InheritanceStrategy::Fallback),
    )
    .unwrap();
    api.define_attribute(
        &AttributeDefinition::new("title", DataType::String).syncs_to(Channel::Shopify),
    )
    .unwrap();

    let product = Product::new("BLIND", "Roller blind");
    api.add_product(&product).unwrap();
    api.add_variant(&Variant::new(&product, "BLIND-60", "60 cm"))
        .unwrap();
    api.add_variant(&Variant::new(&product, "BLIND-90", "90 cm"))
        .unwrap();
    dir
}

fn catalog_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("catalog"));
    cmd.env_remove("CATALOG_LOG")
        .env_remove("CATALOG_DATA_FILE")
        .env_remove("CATALOG_CLEANUP_ACTION")
        .arg("--data-dir")
        .arg(dir.path());
    cmd
}

#[test]
fn test_variant_sees_product_value() {
    let dir = seeded();

    catalog_cmd(&dir)
        .args(["set", "BLIND", "light_filtering", "Blackout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("light_filtering: created (Blackout)"));

    catalog_cmd(&dir)
        .args(["get", "BLIND-60", "light_filtering"])
        .assert()
        .success()
        .stdout("light_filtering: Blackout\n");

    catalog_cmd(&dir)
        .args(["get", "variant:BLIND-60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[parent]"))
        .stdout(predicate::str::contains("warranty_years"));
}

#[test]
fn test_override_explain_and_clear() {
    let dir = seeded();
    catalog_cmd(&dir)
        .args(["set", "BLIND", "light_filtering", "Blackout"])
        .assert()
        .success();

    catalog_cmd(&dir)
        .args(["override", "BLIND-60", "light_filtering", "Sheer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created (Sheer)"));

    catalog_cmd(&dir)
        .args(["explain", "BLIND-60", "light_filtering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("= Sheer (by explicit)"))
        .stdout(predicate::str::contains("(override)"));

    catalog_cmd(&dir)
        .args(["clear-override", "BLIND-60", "light_filtering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reverted (Blackout)"));

    catalog_cmd(&dir)
        .args(["get", "BLIND-60", "light_filtering"])
        .assert()
        .success()
        .stdout("light_filtering: Blackout\n");

    // Nothing left to clear.
    catalog_cmd(&dir)
        .args(["clear-override", "BLIND-60", "light_filtering"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("light_filtering"));
}

#[test]
fn test_invalid_value_is_rejected_and_not_stored() {
    let dir = seeded();

    catalog_cmd(&dir)
        .args(["set", "BLIND", "warranty_years", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("warranty_years"));

    catalog_cmd(&dir)
        .args(["get", "BLIND", "warranty_years"])
        .assert()
        .success()
        .stdout("warranty_years: (null)\n");
}

#[test]
fn test_unknown_owner_fails() {
    let dir = seeded();
    catalog_cmd(&dir)
        .args(["get", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No owner matches 'NOPE'"));
}

#[test]
fn test_inherit_all_for_every_variant() {
    let dir = seeded();
    catalog_cmd(&dir)
        .args(["set", "BLIND", "light_filtering", "Sheer"])
        .assert()
        .success();

    let output = catalog_cmd(&dir)
        .args(["inherit-all", "BLIND", "--all-variants"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("1 inherited, 1 skipped").count(), 2);
    assert!(text.contains("warranty_years: product does not have this attribute"));

    catalog_cmd(&dir)
        .args(["--json", "get", "BLIND-90", "light_filtering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"enum\""))
        .stdout(predicate::str::contains("\"value\": \"Sheer\""));
}

#[test]
fn test_import_reports_per_key_errors() {
    let dir = seeded();
    catalog_cmd(&dir)
        .args([
            "import",
            "BLIND",
            "light_filtering=Blackout",
            "warranty_years=lots",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created, 0 updated, 0 unchanged"))
        .stdout(predicate::str::contains("warranty_years"));

    catalog_cmd(&dir)
        .args(["import", "BLIND", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected key=value"));
}

#[test]
fn test_sync_status_and_mark_synced() {
    let dir = seeded();
    catalog_cmd(&dir)
        .args(["set", "BLIND", "title", "Roller blind"])
        .assert()
        .success();

    catalog_cmd(&dir)
        .args(["sync-status", "BLIND", "--channel", "shopify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title  never synced"));

    catalog_cmd(&dir)
        .args(["mark-synced", "BLIND", "shopify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 marked synced"));

    catalog_cmd(&dir)
        .args(["sync-status", "BLIND", "--channel", "shopify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title  synced"))
        .stdout(predicate::str::contains("ready to sync"));
}

#[test]
fn test_config_file_in_data_dir() {
    let dir = seeded();
    fs::write(
        dir.path().join("catalog.toml"),
        "cleanup_action = \"remove\"\n",
    )
    .unwrap();

    catalog_cmd(&dir)
        .args(["config", "cleanup_action"])
        .assert()
        .success()
        .stdout("remove\n");

    catalog_cmd(&dir)
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data_file = catalog.json"));

    catalog_cmd(&dir)
        .args(["cleanup", "BLIND"])
        .assert()
        .success()
        .stdout("Nothing to clean up (remove).\n");
}
