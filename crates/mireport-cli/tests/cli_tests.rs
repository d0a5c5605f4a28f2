//! File-level tests of the conversion front end

use mireport_cli::{load_profile, load_taxonomy, read_document, run_convert, Outcome, EXIT_INCOMPLETE, EXIT_OK};
use mireport_taxonomy::{TaxonomyCache, TaxonomyError};
use mireport_test_utils::{metadata_json, vsme_snapshot};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn taxonomy_file(dir: &TempDir) -> PathBuf {
    write(dir, "vsme.json", &serde_json::to_string(&vsme_snapshot()).unwrap())
}

#[test]
fn converts_structured_document() {
    let dir = TempDir::new().unwrap();
    let cache = TaxonomyCache::new();
    let taxonomy = load_taxonomy(&cache, &taxonomy_file(&dir)).unwrap();
    let input = write(
        &dir,
        "report.json",
        &json!({
            "metadata": metadata_json(),
            "namedRanges": {"NumberOfEmployees": 250, "Revenue": {"value": "1000000", "unit": "EUR"}}
        })
        .to_string(),
    );

    let outcome = run_convert(taxonomy, load_profile(None).unwrap(), &input).unwrap();
    assert_eq!(outcome.exit_code(), EXIT_OK);

    let json = outcome.to_json().unwrap();
    assert_eq!(json["report"]["facts"].as_array().unwrap().len(), 2);
    assert!(json["diagnostics"].is_array());
}

#[test]
fn incomplete_report_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let cache = TaxonomyCache::new();
    let taxonomy = load_taxonomy(&cache, &taxonomy_file(&dir)).unwrap();
    let input = write(&dir, "report.json", r#"{"NumberOfEmployees": 250}"#);

    let outcome = run_convert(taxonomy, load_profile(None).unwrap(), &input).unwrap();
    assert_eq!(outcome.exit_code(), EXIT_INCOMPLETE);
    let Outcome::Incomplete { reasons, .. } = &outcome else {
        panic!("expected incomplete report");
    };
    assert_eq!(reasons.len(), 2);

    let json = outcome.to_json().unwrap();
    assert!(json["report"].is_null());
    assert_eq!(json["reasons"].as_array().unwrap().len(), 2);
}

#[test]
fn yaml_profile_and_input() {
    let dir = TempDir::new().unwrap();
    let cache = TaxonomyCache::new();
    let taxonomy = load_taxonomy(&cache, &taxonomy_file(&dir)).unwrap();
    let profile = write(
        &dir,
        "profile.yaml",
        "concept-units:\n  EnergyConsumption: GJ\ndefault-currency: EUR\n",
    );
    let input = write(
        &dir,
        "report.yaml",
        "metadata:\n  entity:\n    identifier: 5493001KJTIIGC8Y1R12\n    identifierScheme: lei\n  reportingPeriod:\n    start: 2024-01-01\n    end: 2024-12-31\nnamedRanges:\n  EnergyConsumption: 1200\n",
    );

    let outcome = run_convert(taxonomy, load_profile(Some(&profile)).unwrap(), &input).unwrap();
    let Outcome::Converted(conversion) = outcome else {
        panic!("expected a report");
    };
    let fact = &conversion.report.facts[0];
    assert_eq!(conversion.report.unit_of(fact).unwrap().to_string(), "utr:GJ");
}

#[test]
fn taxonomy_is_loaded_once_per_path() {
    let dir = TempDir::new().unwrap();
    let cache = TaxonomyCache::new();
    let path = taxonomy_file(&dir);
    let a = load_taxonomy(&cache, &path).unwrap();
    let b = load_taxonomy(&cache, &path).unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(cache.stats().loaded, 1);
}

#[test]
fn cached_taxonomy_survives_file_removal_but_missing_file_does_not_cache() {
    let dir = TempDir::new().unwrap();
    let cache = TaxonomyCache::new();
    let path = taxonomy_file(&dir);
    load_taxonomy(&cache, &path).unwrap();
    fs::remove_file(&path).unwrap();
    assert!(load_taxonomy(&cache, &path).is_ok());

    let missing = dir.path().join("absent.json");
    let err = load_taxonomy(&cache, &missing).unwrap_err();
    let cause = err.downcast_ref::<TaxonomyError>().unwrap();
    assert!(matches!(cause, TaxonomyError::LoadFailed(msg) if msg.contains("absent.json")));
    assert_eq!(cache.stats().loaded, 1);
    assert_eq!(cache.entry_points().len(), 1);
}

#[test]
fn unreadable_files_are_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(read_document(&missing).is_err());
    assert!(load_profile(Some(&write(&dir, "bad.json", "{not json"))).is_err());
    assert!(load_taxonomy(&TaxonomyCache::new(), &write(&dir, "bad.yaml", "entryPoint: ''")).is_err());
}
