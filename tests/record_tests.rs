//! Integration tests for record settings: dynamic entries, starter entries
//! and entry mappers.

use serde_json::{Value, json};
use setset::{ErrorKind, Leaf, Manager, Namespace, Record};

fn data(manager: &Manager) -> Value {
    Value::Object(manager.data().clone())
}

fn entry_b() -> Namespace {
    Namespace::new().field("b", Leaf::new())
}

mod change_tests {
    use super::*;

    #[test]
    fn entries_are_created_on_the_fly() {
        let spec = Namespace::new().field("a", Record::new(entry_b()));
        let mut manager = Manager::new(spec).unwrap();
        assert_eq!(data(&manager), json!({ "a": {} }));

        manager.change(json!({ "a": { "foobar": { "b": 2 } } })).unwrap();
        assert_eq!(data(&manager), json!({ "a": { "foobar": { "b": 2 } } }));
    }

    #[test]
    fn new_entries_get_entry_defaults() {
        let entry = Namespace::new()
            .field("b", Leaf::new())
            .field("c", Leaf::new().with_default(json!(100)));
        let mut manager = Manager::new(Namespace::new().field("a", Record::new(entry))).unwrap();

        manager.change(json!({ "a": { "foobar": { "b": 2 } } })).unwrap();
        assert_eq!(data(&manager), json!({ "a": { "foobar": { "b": 2, "c": 100 } } }));
    }

    #[test]
    fn existing_entries_are_merged() {
        let mut manager = Manager::new(Namespace::new().field(
            "a",
            Record::new(Namespace::new().field("b", Leaf::new()).field("c", Leaf::new())),
        ))
        .unwrap();

        manager.change(json!({ "a": { "foo": { "b": 1 } } })).unwrap();
        manager.change(json!({ "a": { "foo": { "c": 2 }, "bar": { "b": 3 } } })).unwrap();
        assert_eq!(
            data(&manager),
            json!({ "a": { "foo": { "b": 1, "c": 2 }, "bar": { "b": 3 } } })
        );
    }

    #[test]
    fn non_object_input_errors_gracefully() {
        let spec = Namespace::new().field("a", Record::new(entry_b()));
        let mut manager = Manager::new(spec).unwrap();

        let err = manager.change(json!({ "a": 1 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordInput);
        assert_eq!(err.path(), "a");
        assert_eq!(data(&manager), json!({ "a": {} }));
    }

    #[test]
    fn record_without_specifier_passes_through() {
        let mut manager = Manager::new(Namespace::new()).unwrap();
        manager.change(json!({ "a": { "foobar": { "b": 2 } } })).unwrap();
        assert_eq!(data(&manager), json!({ "a": { "foobar": { "b": 2 } } }));
    }

    #[test]
    fn entry_shorthand_is_expanded() {
        let entry = Namespace::new()
            .with_shorthand(|command| Ok(json!({ "command": command })))
            .field("command", Leaf::new())
            .field("timeout", Leaf::new().with_default(json!(30)));
        let spec = Namespace::new().field("hooks", Record::new(entry));
        let mut manager = Manager::new(spec).unwrap();

        manager.change(json!({ "hooks": { "build": "make" } })).unwrap();
        assert_eq!(
            data(&manager),
            json!({ "hooks": { "build": { "command": "make", "timeout": 30 } } })
        );
    }
}

mod initial_tests {
    use super::*;

    #[test]
    fn starter_entries_are_initialized() {
        let spec = Namespace::new().field(
            "a",
            Record::new(entry_b()).with_initial(|| Ok(json!({ "foobar": { "b": 2 } }))),
        );
        let manager = Manager::new(spec).unwrap();
        assert_eq!(data(&manager), json!({ "a": { "foobar": { "b": 2 } } }));

        let record = manager.metadata().fields["a"].as_record().unwrap();
        let entry = json!({
            "foobar": {
                "type": "namespace",
                "fields": { "b": { "type": "leaf", "value": 2, "initial": 2, "from": "initial" } }
            }
        });
        assert_eq!(
            serde_json::to_value(record).unwrap(),
            json!({ "from": "initial", "value": entry, "initial": entry })
        );
    }

    #[test]
    fn sub_initializers_fill_fields_not_given() {
        let spec = Namespace::new().field(
            "a",
            Record::new(
                Namespace::new()
                    .field("b", Leaf::new().with_default(json!(1)))
                    .field("c", Leaf::new()),
            )
            .with_initial(|| Ok(json!({ "foobar": { "c": 1 }, "other": { "b": 2 } }))),
        );
        let manager = Manager::new(spec).unwrap();
        assert_eq!(
            data(&manager),
            json!({ "a": { "foobar": { "b": 1, "c": 1 }, "other": { "b": 2 } } })
        );
    }

    #[test]
    fn initial_snapshot_survives_changes() {
        let spec = Namespace::new().field(
            "a",
            Record::new(
                Namespace::new()
                    .field("b", Leaf::new().with_default(json!(2)))
                    .field("c", Leaf::new().with_default(json!(100))),
            )
            .with_initial(|| Ok(json!({ "foobar": { "c": 1 } }))),
        );
        let mut manager = Manager::new(spec).unwrap();

        manager.change(json!({ "a": { "foobar": { "c": 3 }, "new": {} } })).unwrap();
        assert_eq!(
            data(&manager),
            json!({ "a": { "foobar": { "b": 2, "c": 3 }, "new": { "b": 2, "c": 100 } } })
        );

        let record = manager.metadata().fields["a"].as_record().unwrap();
        assert_eq!(record.from, setset::Provenance::Change);
        assert!(!record.initial.contains_key("new"));
        let initial = record.initial["foobar"].as_namespace().unwrap();
        assert_eq!(initial.fields["c"].as_leaf().unwrap().value, Some(json!(1)));

        assert_eq!(
            Value::Object(manager.original()),
            json!({ "a": { "foobar": { "b": 2, "c": 1 } } })
        );
    }
}

mod map_tests {
    use super::*;

    #[test]
    fn entry_map_context_contains_key() {
        let entry = Namespace::new()
            .with_map(|_, ctx| Ok(json!({ "b2": ctx })))
            .field("b1", Leaf::new());
        let mut manager = Manager::new(Namespace::new().field("a", Record::new(entry))).unwrap();

        manager.change(json!({ "a": { "foobar": { "b1": "ignore" } } })).unwrap();
        assert_eq!(
            data(&manager),
            json!({ "a": { "foobar": {
                "b1": "ignore",
                "b2": { "path": ["__root__", "a", "foobar"], "key": "foobar" }
            } } })
        );
    }

    #[test]
    fn entry_map_runs_over_starter_entries() {
        let entry = Namespace::new()
            .with_map(|input, ctx| Ok(json!({ "b2": { "input": input, "key": ctx.key.clone() } })))
            .field("b1", Leaf::new());
        let spec = Namespace::new().field(
            "a",
            Record::new(entry).with_initial(|| Ok(json!({ "foo": { "b1": "" } }))),
        );
        let manager = Manager::new(spec).unwrap();

        assert_eq!(
            data(&manager),
            json!({ "a": { "foo": { "b1": "", "b2": { "input": { "b1": "" }, "key": "foo" } } } })
        );
    }

    #[test]
    fn shadow_fields_are_left_to_the_mapper() {
        let entry = Namespace::new()
            .field("name", Leaf::new())
            .field("label", Leaf::new().shadow())
            .with_map(|input, _| {
                let name = input["name"].as_str().unwrap_or("");
                Ok(json!({ "label": format!("[{name}]") }))
            });
        let spec = Namespace::new().field(
            "a",
            Record::new(entry)
                .with_initial(|| Ok(json!({ "x": { "name": "x", "label": "ignored" } }))),
        );
        let manager = Manager::new(spec).unwrap();

        assert_eq!(data(&manager), json!({ "a": { "x": { "name": "x", "label": "[x]" } } }));
        let entry = manager.metadata().fields["a"].as_record().unwrap().value["x"]
            .as_namespace()
            .unwrap();
        assert!(!entry.fields.contains_key("label"));
    }
}
