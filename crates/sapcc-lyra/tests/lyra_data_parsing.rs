//! Integration tests for parsing Lyra data.
//!
//! Chef and script automations decode into the same struct; each keeps the
//! fields of its own flavor.

use sapcc_lyra::models::{Automation, AutomationType};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_automations() -> Vec<Automation> {
    let fixture_path = fixtures_dir().join("automation_list.json");
    let json_data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize automation list: {e}"))
}

#[test]
fn test_chef_automation() {
    let automations = load_automations();
    let chef = &automations[0];

    assert_eq!(chef.automation_type, AutomationType::Chef);
    assert_eq!(chef.run_list, vec!["role[base]", "recipe[nginx]"]);
    assert!(chef.debug);
    assert!(chef.repository_authentication_enabled);
    assert_eq!(
        chef.chef_attributes.as_ref().unwrap()["nginx"]["workers"],
        4
    );
    assert!(chef.path.is_none());
    assert!(chef.arguments.is_empty());
}

#[test]
fn test_script_automation() {
    let automations = load_automations();
    let script = &automations[1];

    assert_eq!(script.automation_type, AutomationType::Script);
    assert_eq!(script.path.as_deref(), Some("bin/rotate.sh"));
    assert_eq!(script.arguments, vec!["--keep", "7"]);
    assert_eq!(script.environment["LOG_DIR"], "/var/log/app");
    assert!(script.run_list.is_empty());
    assert!(script.chef_attributes.is_none());
    assert!(!script.debug);
}

#[test]
fn test_automation_round_trip() {
    let automations = load_automations();
    let encoded = serde_json::to_string(&automations).unwrap();
    let decoded: Vec<Automation> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, automations);
}
