//! End-to-end resolution scenarios through the composition engine

use super::test_utils::{engine, label, owned_by, registry, under_parent, FixedGroups};
use canopy::element::SHARED_ROOT_PRIORITY;
use canopy::registry::{SharedRootGroup, SharedRootRegistry};
use canopy::tree::{AttachmentPoint, TreeDefinitionBuilder};
use canopy::{CompositionResult, Element, Identifier, Piggybag, Position};
use std::sync::Arc;

fn perspective_fixture() -> canopy::CompositionEngine {
    let trees = registry(vec![
        TreeDefinitionBuilder::new("TreeA", "root", label("A"))
            .child("root", "n1", label("N1"))
            .child("root", "n2", label("N2"))
            .build()
            .unwrap(),
        TreeDefinitionBuilder::new("TreeB", "root", label("B"))
            .child("root", "n3", label("N3"))
            .build()
            .unwrap(),
    ]);
    let group = SharedRootGroup {
        group_id: "P1".to_string(),
        label: "Settings".to_string(),
        member_trees: vec![
            Arc::clone(trees.get("TreeA").unwrap()),
            Arc::clone(trees.get("TreeB").unwrap()),
        ],
        attachment_point: AttachmentPoint::perspective("Root", Position::Top),
        element: Element::new("perspective:P1", "Settings"),
    };
    engine(
        trees,
        SharedRootRegistry::new(Arc::new(FixedGroups(vec![group]))),
    )
}

fn ids(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.id.as_str()).collect()
}

/// A perspective group concatenates its member trees' root children in order
#[test]
fn test_perspective_group_children_in_member_order() {
    let engine = perspective_fixture();
    let elements = engine
        .expand_children(&Identifier::perspective("P1"), &Piggybag::new())
        .unwrap();
    assert_eq!(ids(&elements), vec!["TreeA/n1", "TreeA/n2", "TreeB/n3"]);
    assert!(engine
        .has_children(&Identifier::perspective("P1"), &Piggybag::new())
        .unwrap());
}

/// An unknown perspective resolves to nothing
#[test]
fn test_unknown_perspective_is_empty() {
    let engine = perspective_fixture();
    let id = Identifier::perspective("Nope");
    assert!(engine.expand_children(&id, &Piggybag::new()).unwrap().is_empty());
    assert!(!engine.has_children(&id, &Piggybag::new()).unwrap());
}

/// Shared-root groups attach with the fixed high priority and lead their position
#[test]
fn test_group_attachment_sorts_before_trees() {
    let trees = registry(vec![TreeDefinitionBuilder::new("Home", "root", label("Home"))
        .child("root", "recent", label("Recent"))
        .attach(AttachmentPoint::perspective("Root", Position::Top).with_priority(50))
        .build()
        .unwrap()]);
    let group = SharedRootGroup {
        group_id: "P1".to_string(),
        label: "Settings".to_string(),
        member_trees: vec![Arc::clone(trees.get("Home").unwrap())],
        attachment_point: AttachmentPoint::perspective("Root", Position::Top),
        element: Element::new("perspective:P1", "Settings"),
    };
    let engine = engine(
        trees,
        SharedRootRegistry::new(Arc::new(FixedGroups(vec![group]))),
    );

    let merged = engine
        .merged_root_attachments(&Identifier::perspective("Root"), &Piggybag::new())
        .unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].position_priority, SHARED_ROOT_PRIORITY);
    assert_eq!(merged[0].elements[0].label, "Settings");
    assert_eq!(merged[1].position_priority, 50);
    assert_eq!(ids(&merged[1].elements), vec!["Home/recent"]);
}

fn record_fixture() -> canopy::CompositionEngine {
    let trees = registry(vec![TreeDefinitionBuilder::new("T1", "root", label("Root"))
        .child("root", "x", label("X"))
        .child("root", "y", label("Y"))
        .data_child("x", "t-under-x", "T", label("Ts"))
        .data_child("y", "t-under-y", "T", label("Ts"))
        .child("t-under-x", "x-detail", label("Detail X"))
        .child("t-under-y", "y-detail", label("Detail Y"))
        .build()
        .unwrap()]);
    engine(trees, SharedRootRegistry::empty())
}

/// A content record resolves through the parent recorded in the bag
#[test]
fn test_content_record_resolves_by_parent() {
    let engine = record_fixture();
    let record = Identifier::record("T", "17");

    let elements = engine.expand_children(&record, &under_parent("x")).unwrap();
    assert_eq!(ids(&elements), vec!["T1/x-detail"]);

    let elements = engine.expand_children(&record, &under_parent("y")).unwrap();
    assert_eq!(ids(&elements), vec!["T1/y-detail"]);
}

/// A parent with no matching data node yields a single error element
#[test]
fn test_content_record_with_stale_parent() {
    let engine = record_fixture();
    let elements = engine
        .expand_children(&Identifier::record("T", "17"), &under_parent("z"))
        .unwrap();
    assert_eq!(elements.len(), 1);
    let error = &elements[0];
    assert!(error.is_error);
    assert_eq!(error.label, "Error in tree (T1)");
    assert!(error.tooltip.as_deref().unwrap().contains("out of sync"));
    assert_eq!(error.metadata.get("tree_id").map(String::as_str), Some("T1"));
}

/// Structural identifiers expand within the tree named by the bag
#[test]
fn test_structural_identifier_uses_owning_tree() {
    let engine = record_fixture();
    let elements = engine
        .expand_children(&Identifier::simple("x"), &owned_by("T1"))
        .unwrap();
    assert_eq!(ids(&elements), vec!["T1/t-under-x"]);

    let elements = engine
        .expand_children(&Identifier::generator("root"), &owned_by("T1"))
        .unwrap();
    assert_eq!(ids(&elements), vec!["T1/x", "T1/y"]);
}

/// One tree attached twice yields two results with identical elements
#[test]
fn test_tree_attached_at_top_and_bottom() {
    let trees = registry(vec![TreeDefinitionBuilder::new("Links", "root", label("Links"))
        .child("root", "inbound", label("Inbound"))
        .attach(AttachmentPoint::entity_type("Page", Position::Bottom))
        .attach(AttachmentPoint::entity_type("Page", Position::Top))
        .build()
        .unwrap()]);
    let engine = engine(trees, SharedRootRegistry::empty());
    let page = Identifier::record("Page", "1");

    let results: Vec<CompositionResult> = engine
        .expand_root_attachments(&page, &Piggybag::new())
        .unwrap()
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].position, Position::Bottom);
    assert_eq!(results[1].position, Position::Top);
    assert_eq!(ids(&results[0].elements), vec!["Links/inbound"]);
    assert_eq!(results[0].elements, results[1].elements);

    let merged = engine.merged_root_attachments(&page, &Piggybag::new()).unwrap();
    assert_eq!(merged[0].position, Position::Top);
    assert_eq!(merged[1].position, Position::Bottom);
}

/// Nothing applies: no children, no attachments, and structural lookups fail softly
#[test]
fn test_no_matching_tree() {
    let engine = record_fixture();
    let user = Identifier::record("User", "9");

    assert!(!engine.has_children(&user, &Piggybag::new()).unwrap());
    assert!(engine.expand_children(&user, &Piggybag::new()).unwrap().is_empty());
    assert_eq!(
        engine
            .expand_root_attachments(&user, &Piggybag::new())
            .unwrap()
            .count(),
        0
    );

    let elements = engine
        .expand_children(&Identifier::simple("x"), &Piggybag::new())
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert!(elements[0].is_error);
}

/// Repeated expansion with equal inputs gives equal output
#[test]
fn test_expansion_is_idempotent() {
    let engine = record_fixture();
    let record = Identifier::record("T", "17");
    let bag = under_parent("x");

    let first = engine.expand_children(&record, &bag).unwrap();
    let second = engine.expand_children(&record, &bag).unwrap();
    assert_eq!(first, second);

    let grouping: Identifier = "grouping:x;year=2024;1,2".parse().unwrap();
    let a = engine.expand_children(&grouping, &owned_by("T1")).unwrap();
    let b = engine.expand_children(&grouping, &owned_by("T1")).unwrap();
    assert_eq!(a, b);
    assert_eq!(ids(&a), vec!["T1/t-under-x"]);
}
