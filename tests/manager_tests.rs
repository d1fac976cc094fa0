//! Integration tests for the manager: provenance, reset, original, atomic
//! changes, spec validation and layered input.

use serde_json::{Value, json};
use setset::input::{load_file, merge_layers};
use setset::{ErrorKind, Leaf, Manager, ManagerOptions, Mode, Namespace, Provenance, Record};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

fn data(manager: &Manager) -> Value {
    Value::Object(manager.data().clone())
}

/// A spec with every kind of node and only declared defaults.
fn server_spec() -> Namespace {
    Namespace::new()
        .field("name", Leaf::new().with_default(json!("app")))
        .field(
            "server",
            Namespace::new()
                .with_shorthand(|port| Ok(json!({ "port": port })))
                .field("host", Leaf::new().with_default(json!("localhost")))
                .field("port", Leaf::new().with_default(json!(80))),
        )
        .field(
            "hooks",
            Record::new(
                Namespace::new()
                    .field("command", Leaf::new())
                    .field("timeout", Leaf::new().with_default(json!(30))),
            )
            .with_initial(|| Ok(json!({ "build": { "command": "make" } }))),
        )
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_original() {
        let manager = Manager::new(server_spec()).unwrap();
        let expected = json!({
            "name": "app",
            "server": { "host": "localhost", "port": 80 },
            "hooks": { "build": { "command": "make", "timeout": 30 } }
        });

        assert_eq!(data(&manager), expected);
        assert_eq!(Value::Object(manager.original()), expected);
    }

    #[test]
    fn provenance_flips_on_change_and_initial_is_kept() {
        let spec = Namespace::new().field("a", Leaf::new().with_default(json!(0)));
        let mut manager = Manager::new(spec).unwrap();
        manager.change(json!({ "a": 1 })).unwrap();

        assert_eq!(
            serde_json::to_value(&manager.metadata().fields["a"]).unwrap(),
            json!({ "type": "leaf", "value": 1, "initial": 0, "from": "change" })
        );
    }

    #[test]
    fn original_ignores_changes() {
        let mut manager = Manager::new(server_spec()).unwrap();
        let original = manager.original();

        manager
            .change(json!({
                "name": "other",
                "server": 8080,
                "hooks": { "test": { "command": "cargo test" } }
            }))
            .unwrap();

        assert_eq!(manager.original(), original);
        assert_eq!(manager.data()["server"], json!({ "host": "localhost", "port": 8080 }));
    }

    #[test]
    fn reset_restores_defaults() {
        let fresh = Manager::new(server_spec()).unwrap();
        let mut manager = Manager::new(server_spec()).unwrap();

        manager.change(json!({ "name": "other" })).unwrap();
        manager.change(json!({ "server": { "port": 1 }, "hooks": { "x": {} } })).unwrap();
        manager.reset().unwrap();

        assert_eq!(data(&manager), data(&fresh));
        assert_eq!(manager.metadata(), fresh.metadata());
        let name = manager.metadata().fields["name"].as_leaf().unwrap();
        assert_eq!(name.from, Provenance::Initial);
    }

    #[test]
    fn changes_chain() {
        let mut manager = Manager::new(server_spec()).unwrap();
        manager
            .change(json!({ "name": "a" }))
            .and_then(|manager| manager.change(json!({ "server": 9000 })))
            .unwrap();

        assert_eq!(manager.data()["name"], json!("a"));
        assert_eq!(manager.data()["server"]["port"], json!(9000));
    }

    #[test]
    fn repeated_change_is_idempotent() {
        let mut manager = Manager::new(server_spec()).unwrap();
        let input = json!({
            "server": { "port": 8080 },
            "hooks": { "lint": { "command": "clippy" } },
            "extra": [1]
        });

        manager.change(input.clone()).unwrap();
        let once = data(&manager);
        let metadata = manager.metadata().clone();
        manager.change(input).unwrap();

        assert_eq!(data(&manager), once);
        assert_eq!(manager.metadata(), &metadata);
    }
}

mod atomicity_tests {
    use super::*;

    #[test]
    fn failing_commit_mapper_leaves_state_untouched() {
        let armed = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&armed);
        let spec = Namespace::new()
            .field("a", Leaf::new().with_default(json!(1)))
            .field(
                "b",
                Namespace::new()
                    .with_map(move |_, _| {
                        if trigger.load(Ordering::SeqCst) {
                            anyhow::bail!("mapper failed");
                        }
                        Ok(json!({}))
                    })
                    .field("c", Leaf::new().with_default(json!(2))),
            );
        let mut manager = Manager::new(spec).unwrap();
        let before = data(&manager);
        let metadata = manager.metadata().clone();

        armed.store(true, Ordering::SeqCst);
        let err = manager.change(json!({ "a": 5, "b": { "c": 6 } })).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Mapper);
        assert_eq!(err.path(), "b");
        assert_eq!(data(&manager), before);
        assert_eq!(manager.metadata(), &metadata);
    }

    #[test]
    fn failing_new_record_entry_leaves_record_untouched() {
        let spec = Namespace::new().field(
            "hooks",
            Record::new(
                Namespace::new().field(
                    "command",
                    Leaf::new().with_validate(|value| {
                        Ok(value.is_null().then(|| setset::Violation::new(["command is required"])))
                    }),
                ),
            ),
        );
        let mut manager = Manager::new(spec).unwrap();

        let err = manager
            .change(json!({ "hooks": { "build": { "command": null } } }))
            .unwrap_err();

        assert_eq!(err.path(), "hooks.build.command");
        assert_eq!(data(&manager), json!({ "hooks": {} }));
        assert!(manager.metadata().fields["hooks"].as_record().unwrap().value.is_empty());
    }
}

mod spec_validation_tests {
    use super::*;

    fn invalid_spec() -> Namespace {
        Namespace::new().field("a", Record::new(Leaf::new()))
    }

    #[test]
    fn development_mode_rejects_invalid_specs() {
        let err = Manager::new(invalid_spec()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpecifier);
        assert_eq!(
            err.to_string(),
            "Record entry for setting specifier at path \"a\" was invalid. Record entries must be namespaces. Got: leaf"
        );
    }

    #[test]
    fn production_mode_skips_the_check() {
        let options = ManagerOptions::default().with_mode(Mode::Production);
        let mut manager = Manager::with_options(invalid_spec(), options).unwrap();

        // the bad entry only surfaces once a record entry is touched
        let err = manager.change(json!({ "a": { "x": 1 } })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpecifier);
    }

    #[test]
    fn dotted_field_names_are_rejected() {
        let err = Manager::new(Namespace::new().field("a.b", Leaf::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSpecifier);
        assert!(err.to_string().starts_with("Root namespace"));
    }
}

mod layer_tests {
    use super::*;

    #[test]
    fn layers_merge_before_applying() {
        let mut manager = Manager::new(server_spec()).unwrap();
        manager
            .change_layers(vec![
                json!({ "server": { "host": "example.com", "port": 1 } }),
                json!({ "server": { "port": 2 } }),
            ])
            .unwrap();

        assert_eq!(
            manager.data()["server"],
            json!({ "host": "example.com", "port": 2 })
        );
        let port = manager.metadata().fields["server"].as_namespace().unwrap().fields["port"]
            .as_leaf()
            .unwrap();
        assert_eq!(port.from, Provenance::Change);
        assert_eq!(port.initial, Some(json!(80)));
    }

    #[test]
    fn later_shorthand_layer_replaces_longhand() {
        let mut manager = Manager::new(server_spec()).unwrap();
        manager
            .change_layers(vec![
                json!({ "server": { "host": "example.com" } }),
                json!({ "server": 9000 }),
            ])
            .unwrap();

        assert_eq!(manager.data()["server"], json!({ "host": "localhost", "port": 9000 }));
    }

    #[test]
    fn file_layers_apply_in_order() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("settings.yaml");
        let user = temp.path().join("settings.json");
        std::fs::write(
            &project,
            r#"
name: project
hooks:
  test:
    command: cargo test
"#,
        )
        .unwrap();
        std::fs::write(&user, r#"{ "name": "user" }"#).unwrap();

        let layers = vec![load_file(&project).unwrap(), load_file(&user).unwrap()];
        let mut manager = Manager::new(server_spec()).unwrap();
        manager.change(merge_layers(layers)).unwrap();

        assert_eq!(manager.data()["name"], json!("user"));
        assert_eq!(
            manager.data()["hooks"]["test"],
            json!({ "command": "cargo test", "timeout": 30 })
        );
    }
}
