//! Integration tests for parsing Limes data.
//!
//! Project reports arrive wrapped in a `projects` envelope; detail mode adds
//! opaque subresources that are kept as raw JSON.

use sapcc_core::pagination::Extract;
use sapcc_limes::models::ProjectReport;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_projects() -> Vec<ProjectReport> {
    let fixture_path = fixtures_dir().join("domain_projects.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    let body: Value = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to parse fixture: {e}"));
    ProjectReport::extract(&body).unwrap_or_else(|e| panic!("Failed to extract projects: {e}"))
}

#[test]
fn test_project_envelope() {
    let projects = load_projects();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].name, "web-frontend");
    assert_eq!(projects[1].name, "sandbox");
}

#[test]
fn test_bursting_usage() {
    let projects = load_projects();
    let web = &projects[0];

    let bursting = web.bursting.as_ref().expect("bursting present");
    assert!(bursting.enabled);
    assert!((bursting.multiplier - 0.2).abs() < f64::EPSILON);

    let cores = &web.services[0].resources[0];
    assert_eq!(cores.category.as_deref(), Some("compute"));
    assert_eq!(cores.quota, Some(40));
    assert_eq!(cores.usable_quota, Some(48));
    assert_eq!(cores.burst_usage, Some(4));
}

#[test]
fn test_subresources_stay_raw() {
    let projects = load_projects();
    let instances = &projects[0].services[0].resources[2];
    let subresources = instances.subresources.as_ref().expect("detail present");
    assert_eq!(subresources.as_array().map(Vec::len), Some(2));
    assert_eq!(subresources[1]["status"], "SHUTOFF");
}

#[test]
fn test_units_and_backend_quota() {
    let projects = load_projects();
    let storage = &projects[0].services[1];
    assert_eq!(storage.area, "storage");
    let capacity = &storage.resources[0];
    assert_eq!(capacity.unit, "B");
    assert_eq!(capacity.physical_usage, Some(4_294_967_296));
    assert_eq!(capacity.backend_quota, Some(-1));
    assert_eq!(
        storage.scraped_at.map(|t| t.timestamp()),
        Some(1_700_000_300)
    );
}

#[test]
fn test_no_quota_resources() {
    let projects = load_projects();
    let dns = &projects[1].services[0];
    assert!(dns.scraped_at.is_none());
    assert!(!dns.resources[0].no_quota);
    assert_eq!(dns.resources[0].quota, Some(0));
    assert!(dns.resources[1].no_quota);
    assert!(dns.resources[1].quota.is_none());
}

#[test]
fn test_project_round_trip() {
    for project in load_projects() {
        let encoded = serde_json::to_value(&project).unwrap();
        let decoded: ProjectReport = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, project);
    }
}
