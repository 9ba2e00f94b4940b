//! Integration Tests for the Visibility Engine
//!
//! These tests verify that the evaluator, the dependency graph and the
//! controller work together correctly.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use formlogic_core::field::{
    Condition, ConditionalSpec, FieldDescriptor, FieldId, FieldValues, Operator,
};
use formlogic_core::graph::{DependencyGraph, ValidationIssue};
use formlogic_core::reactive::{AnswerStore, VisibilityController, VisibilityMap};

fn field(id: &str, order: i64, deps: &[&str]) -> FieldDescriptor {
    let field = FieldDescriptor::new(id, order);
    if deps.is_empty() {
        return field;
    }
    field.with_conditional(ConditionalSpec::show_when_all(
        deps.iter().map(|d| Condition::equals(*d, "x")).collect(),
    ))
}

/// A small branching survey with a few levels of nesting.
fn survey() -> Vec<FieldDescriptor> {
    vec![
        field("q7", 7, &["q5", "q6"]),
        field("q1", 1, &[]),
        field("q3", 3, &["q1"]),
        field("q2", 2, &["q1"]),
        field("q5", 5, &["q3"]),
        field("q4", 4, &[]),
        field("q6", 6, &["q2", "q4"]),
        field("q8", 8, &["q8"]),
    ]
}

fn position(order: &[FieldId], id: &FieldId) -> usize {
    order.iter().position(|f| f == id).unwrap()
}

/// Scenario A: a single equals condition shows and hides a field.
#[test]
fn scenario_single_equals_condition() {
    let fields = vec![
        FieldDescriptor::new("A", 0),
        FieldDescriptor::new("B", 1)
            .with_conditional(ConditionalSpec::show_when_all(vec![Condition::equals("A", "yes")])),
    ];
    let mut session = VisibilityController::new(fields, FieldValues::new());

    session.set_field_value("A", json!("yes"));
    assert!(session.visibility("B"));

    session.set_field_value("A", json!("no"));
    assert!(!session.visibility("B"));

    let result = session.evaluation_result("B").unwrap();
    assert!(!result.visible);
    assert!(result.reasons.iter().any(|r| r.contains("'A'")));
}

/// Scenario B: an `any` combinator needs one matching condition.
#[test]
fn scenario_any_combinator() {
    let fields = vec![
        FieldDescriptor::new("A", 0),
        FieldDescriptor::new("B", 1),
        FieldDescriptor::new("C", 2).with_conditional(ConditionalSpec::show_when_any(vec![
            Condition::equals("A", "x"),
            Condition::equals("B", "y"),
        ])),
    ];
    let mut session = VisibilityController::new(fields, FieldValues::new());

    session.set_field_values([(FieldId::from("A"), json!("x")), (FieldId::from("B"), json!("z"))]);
    assert!(session.visibility("C"));

    session.set_field_value("A", json!("w"));
    assert!(!session.visibility("C"));
}

/// Scenario C: a two-field cycle is reported and evaluation still terminates.
#[test]
fn scenario_cycle_is_reported() {
    let fields = vec![field("A", 0, &["B"]), field("B", 1, &["A"])];
    let graph = DependencyGraph::build(fields.clone());
    let report = graph.validate();

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    match &report.errors[0] {
        ValidationIssue::Cycle { path } => {
            let path: Vec<&str> = path.iter().map(FieldId::as_str).collect();
            assert!(path == ["A", "B", "A"] || path == ["B", "A", "B"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }

    let mut session = VisibilityController::new(fields, FieldValues::new());
    session.set_field_value("A", json!("x"));
    assert_eq!(session.visibility_map().len(), 2);
}

/// Scenario D: a reference to a missing field always fails and is reported.
#[test]
fn scenario_dangling_reference() {
    let fields = vec![
        FieldDescriptor::new("A", 0)
            .with_conditional(ConditionalSpec::show_when_all(vec![
                Condition::equals("ghost", "boo"),
            ])),
    ];
    let mut session = VisibilityController::new(fields, FieldValues::new());

    session.set_field_value("ghost", json!("boo"));
    assert!(!session.visibility("A"));
    assert!(session.evaluation_result("A").unwrap().reasons[0].contains("not found"));

    let report = session.validate();
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![ValidationIssue::DanglingReference {
            field_id: FieldId::from("A"),
            missing: FieldId::from("ghost"),
        }]
    );
}

/// Scenario E: `contains` tests membership in a multi-select value.
#[test]
fn scenario_multi_select_contains() {
    let fields = vec![
        FieldDescriptor::new("colors", 0).with_type("multi_select"),
        FieldDescriptor::new("blue_shade", 1).with_conditional(ConditionalSpec::show_when_all(vec![
            Condition::new("colors", Operator::Contains, "blue"),
        ])),
        FieldDescriptor::new("green_shade", 2).with_conditional(ConditionalSpec::show_when_all(vec![
            Condition::new("colors", Operator::Contains, "green"),
        ])),
    ];
    let mut session = VisibilityController::new(fields, FieldValues::new());

    session.set_field_value("colors", json!(["red", "blue"]));

    assert!(session.visibility("blue_shade"));
    assert!(!session.visibility("green_shade"));
}

/// Building twice from the same catalog gives the same order and cycles.
#[test]
fn build_is_idempotent() {
    let first = DependencyGraph::build(survey());
    let second = DependencyGraph::build(survey());

    assert_eq!(first.evaluation_order(), second.evaluation_order());
    assert_eq!(first.cycles(), second.cycles());
}

/// Every dependency is evaluated strictly before its dependent.
#[test]
fn evaluation_order_respects_dependencies() {
    let graph = DependencyGraph::build(survey());
    let order = graph.evaluation_order();

    for (id, node) in graph.nodes() {
        for dep in node.dependencies() {
            assert!(
                position(order, dep) < position(order, id),
                "{dep} should come before {id}"
            );
        }
    }
}

/// A field hanging off a cycle still comes after it and is evaluated normally.
#[test]
fn field_depending_on_a_cycle() {
    let fields = vec![field("a", 0, &["b"]), field("b", 1, &["a"]), field("c", 2, &["a"])];
    let graph = DependencyGraph::build(fields.clone());
    let order = graph.evaluation_order();

    assert!(position(order, &FieldId::from("a")) < position(order, &FieldId::from("c")));
    assert!(!graph.cyclic_fields().contains(&FieldId::from("c")));

    let mut session = VisibilityController::new(fields, FieldValues::new());
    assert!(session.visibility("a"));
    assert!(session.visibility("b"));
    assert!(!session.visibility("c"));

    session.set_field_value("a", json!("x"));
    assert!(session.visibility("c"));
}

/// Self-references never become dependencies.
#[test]
fn no_self_dependency() {
    let graph = DependencyGraph::build(survey());

    for (id, node) in graph.nodes() {
        assert!(!node.dependencies().contains(id));
    }
    assert!(!graph.has_cycles());
}

/// Incremental edits land on the same graph as a fresh build.
#[test]
fn incremental_edits_match_rebuild() {
    let mut graph = DependencyGraph::build(survey());

    graph.add_field(field("q9", 9, &["q7", "q1"])).unwrap();
    graph.update_field(field("q2", 2, &["q4"])).unwrap();
    graph.remove_field("q5").unwrap();
    graph.add_field(field("q5", 5, &["q9"])).unwrap();
    graph.update_field(field("q9", 9, &["q5"])).unwrap();

    let rebuilt = DependencyGraph::build(graph.fields().values().cloned());

    assert_eq!(graph.evaluation_order(), rebuilt.evaluation_order());
    assert_eq!(graph.cycles(), rebuilt.cycles());
    assert!(graph.has_cycles());
    for (id, node) in graph.nodes() {
        let other = rebuilt.node(id.as_str()).unwrap();
        assert_eq!(node.dependencies(), other.dependencies());
        assert_eq!(node.dependents(), other.dependents());
        assert_eq!(node.level(), other.level());
    }
}

/// Removing a field strips conditions that pointed at it.
#[test]
fn removal_strips_dangling_conditions() {
    let mut graph = DependencyGraph::build(survey());
    let change = graph.remove_field("q1").unwrap();

    let mut stripped: Vec<&str> = change.stripped_from.iter().map(FieldId::as_str).collect();
    stripped.sort();
    assert_eq!(stripped, vec!["q2", "q3"]);
    assert!(graph.validate().is_valid);
}

/// Simulate-and-check agrees with a reachability check on an acyclic graph.
#[test]
fn available_references_match_reachability() {
    let graph = DependencyGraph::build(survey());

    for source in graph.fields().keys() {
        let descendants = graph.transitive_dependents(source.as_str()).unwrap();
        let expected: Vec<FieldId> = graph
            .fields_in_display_order()
            .into_iter()
            .map(|f| f.id.clone())
            .filter(|id| id != source && !descendants.contains(id))
            .collect();

        assert_eq!(graph.available_references(source.as_str()).unwrap(), expected);
    }
}

/// Flipping the polarity flag inverts visibility for every input.
#[test]
fn polarity_law() {
    let show = vec![
        FieldDescriptor::new("A", 0),
        FieldDescriptor::new("B", 1)
            .with_conditional(ConditionalSpec::show_when_all(vec![Condition::equals("A", "yes")])),
    ];
    let mut hide = show.clone();
    hide[1].conditional.as_mut().unwrap().show_when_matched = false;

    let mut shown = VisibilityController::new(show, FieldValues::new());
    let mut hidden = VisibilityController::new(hide, FieldValues::new());

    for input in [json!("yes"), json!(" yes "), json!("no"), json!(3), json!(false), Value::Null] {
        shown.set_field_value("A", input.clone());
        hidden.set_field_value("A", input.clone());

        let matches = input.as_str().map(str::trim) == Some("yes");
        assert_eq!(shown.visibility("B"), matches);
        assert_eq!(hidden.visibility("B"), !matches);
    }
}

/// A hidden field's answer never reaches the submission, and comes back empty.
#[test]
fn value_clearing_law() {
    let fields = vec![
        FieldDescriptor::new("employed", 0),
        FieldDescriptor::new("employer", 1).with_conditional(ConditionalSpec::show_when_all(vec![
            Condition::equals("employed", true),
        ])),
    ];
    let mut store = AnswerStore::new(fields, FieldValues::new());

    store.set_answer("employed", json!(true));
    store.set_answer("employer", json!("Acme"));
    assert_eq!(store.visible_answers().get("employer"), Some(&json!("Acme")));

    store.set_answer("employed", json!(false));
    assert!(!store.visible_answers().contains_key("employer"));
    assert!(store.answers().get("employer").is_none());

    store.set_answer("employed", json!(true));
    assert!(store.controller().visibility("employer"));
    assert!(store.answer("employer").is_none());
}

/// Listeners see every pass, and the store can be rebuilt from them alone.
#[test]
fn listener_observes_transitions() {
    let mut session = VisibilityController::new(survey(), FieldValues::new());
    let history: Arc<Mutex<Vec<VisibilityMap>>> = Arc::new(Mutex::new(Vec::new()));
    let history_clone = history.clone();

    session.on_visibility_change(move |map| {
        history_clone.lock().push(map.clone());
    });

    session.set_field_value("q1", json!("x"));
    session.set_field_value("q3", json!("x"));

    let history = history.lock();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].get("q3"), Some(&true));
    assert_eq!(history[0].get("q5"), Some(&false));
    assert_eq!(history[1].get("q5"), Some(&true));
}
