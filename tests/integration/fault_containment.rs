//! A failing tree degrades to one error element; everything else keeps working

use super::test_utils::{engine, failing, label, owned_by, registry, RecordingReporter};
use canopy::engine::diagnostics::COMPONENT;
use canopy::engine::{FailureReporter, StaticLabels};
use canopy::registry::SharedRootRegistry;
use canopy::tree::{AttachmentPoint, TreeDefinitionBuilder};
use canopy::{CompositionResult, Identifier, Piggybag, Position, TreeError};
use std::sync::Arc;

fn fixture(reporter: Arc<RecordingReporter>) -> canopy::CompositionEngine {
    let trees = registry(vec![
        TreeDefinitionBuilder::new("Broken", "root", label("Broken"))
            .child("root", "first", label("First"))
            .child("root", "child", failing())
            .child("first", "nested", label("Nested"))
            .attach(AttachmentPoint::entity_type("Page", Position::Top))
            .attach(AttachmentPoint::entity_type("Page", Position::Bottom))
            .build()
            .unwrap(),
        TreeDefinitionBuilder::new("Healthy", "root", label("Healthy"))
            .child("root", "ok", label("Ok"))
            .child("ok", "fine", label("Fine"))
            .child("ok", "bad", failing())
            .attach(AttachmentPoint::entity_type("Page", Position::Bottom))
            .build()
            .unwrap(),
    ]);
    engine(trees, SharedRootRegistry::empty()).with_reporter(reporter as Arc<dyn FailureReporter>)
}

/// A throwing top-level rule replaces that tree's elements at every attachment point
#[test]
fn test_failing_top_level_rule_is_contained_per_attachment() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(Arc::clone(&reporter));

    let results: Vec<CompositionResult> = engine
        .expand_root_attachments(&Identifier::record("Page", "1"), &Piggybag::new())
        .unwrap()
        .collect();

    assert_eq!(results.len(), 3);
    for broken in &results[..2] {
        assert!(broken.is_error());
        let error = &broken.elements[0];
        assert_eq!(error.label, "Error in tree (Broken)");
        assert!(error.tooltip.as_deref().unwrap().contains("rule exploded"));
        assert_eq!(error.metadata.get("tree_id").map(String::as_str), Some("Broken"));
    }
    assert!(!results[2].is_error());
    let healthy: Vec<&str> = results[2].elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(healthy, vec!["Healthy/ok"]);

    let failures = reporter.failures.lock();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0, COMPONENT);
    assert!(matches!(
        &failures[0].1,
        TreeError::RuleEvaluation { tree_id, node_id, .. } if tree_id == "Broken" && node_id == "child"
    ));
    let messages = reporter.messages.lock();
    assert_eq!(messages[0].1, "Getting elements from the tree 'Broken' failed");
}

/// One failing child replaces the whole expansion with a single error element
#[test]
fn test_expand_children_is_all_or_nothing() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(Arc::clone(&reporter));

    let elements = engine
        .expand_children(&Identifier::simple("ok"), &owned_by("Healthy"))
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert!(elements[0].is_error);
    assert_eq!(elements[0].metadata.get("tree_id").map(String::as_str), Some("Healthy"));
    assert_eq!(reporter.failures.lock().len(), 1);

    // Nodes below a failing sibling still expand on their own
    let elements = engine
        .expand_children(&Identifier::simple("first"), &owned_by("Broken"))
        .unwrap();
    assert_eq!(elements[0].id, "Broken/nested");
}

/// has_children never evaluates rules
#[test]
fn test_has_children_ignores_failing_rules() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(Arc::clone(&reporter));
    assert!(engine
        .has_children(&Identifier::record("Page", "1"), &Piggybag::new())
        .unwrap());
    assert!(reporter.failures.lock().is_empty());
}

/// The error label comes from the configured label source
#[test]
fn test_error_label_is_localized() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(reporter).with_labels(Arc::new(StaticLabels::new("Fehler im Baum")));
    let merged = engine
        .merged_root_attachments(&Identifier::record("Page", "1"), &Piggybag::new())
        .unwrap();
    assert_eq!(merged[0].elements[0].label, "Fehler im Baum (Broken)");
}

/// Without a tree id in the bag the error names the identifier, not a tree
#[test]
fn test_missing_owning_tree_names_identifier() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(Arc::clone(&reporter));
    let elements = engine
        .expand_children(&Identifier::simple("ok"), &Piggybag::new())
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].label, "Error in tree (simple:ok)");
    assert_eq!(elements[0].metadata.get("identifier").map(String::as_str), Some("simple:ok"));
    assert!(!elements[0].metadata.contains_key("tree_id"));
    assert_eq!(reporter.failures.lock().len(), 1);
}

/// Unknown owning tree is reported and contained
#[test]
fn test_unknown_owning_tree_is_contained() {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = fixture(Arc::clone(&reporter));
    let elements = engine
        .expand_children(&Identifier::simple("root"), &owned_by("Missing"))
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].label, "Error in tree (Missing)");
    assert_eq!(
        reporter.failures.lock()[0].1,
        TreeError::UnknownTree("Missing".to_string())
    );
}
