//! Definition files on disk driving the engine and the CLI route table

use canopy::cli::{Commands, RunContext};
use canopy::definitions::{DefinitionFile, RuleCatalog};
use canopy::element::Element;
use canopy::error::{ApiError, RuleError};
use canopy::registry::SharedRootRegistry;
use canopy::tree::{DynamicContext, TreeNode};
use canopy::types::PIGGYBAG_PARENT_NODE_ID;
use canopy::{CompositionEngine, DefinitionError, Identifier, Piggybag, Position};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const TREES: &str = r#"
[[trees]]
id = "content"
root = { id = "root", label = "Content", icon = "folder" }
nodes = [
    { id = "pages", parent = "root", label = "Pages", entity_type = "Page" },
    { id = "versions", parent = "pages", label = "Versions", rule = "versions" },
]
attachments = [
    { kind = "perspective", id = "Root", position = "top", priority = 10 },
    { kind = "record", entity_type = "Page", key = "home", position = "bottom" },
]

[[trees]]
id = "media"
root = { id = "root", label = "Media" }
nodes = [{ id = "images", parent = "root", label = "Images" }]

[[shared_roots]]
id = "library"
label = "Library"
icon = "books"
trees = ["content", "media"]
attachment = { kind = "perspective", id = "Root", position = "top" }
"#;

fn versions(
    _node: &TreeNode,
    identifier: &Identifier,
    _context: &DynamicContext<'_>,
) -> Result<Vec<Element>, RuleError> {
    match identifier {
        Identifier::ContentRecord { key, .. } => Ok(vec![
            Element::new(format!("{}@2", key), "v2"),
            Element::new(format!("{}@1", key), "v1"),
        ]),
        _ => Err(RuleError::new("versions only apply to records")),
    }
}

fn catalog() -> RuleCatalog {
    RuleCatalog::new().with_rule("versions", Arc::new(versions))
}

fn engine_from(source: &str) -> CompositionEngine {
    let file = DefinitionFile::from_toml_str(source).unwrap();
    let trees = Arc::new(file.build_registry(&catalog()).unwrap());
    let shared = SharedRootRegistry::new(Arc::new(file.shared_root_source(Arc::clone(&trees))));
    CompositionEngine::new("console", trees, Arc::new(shared))
}

/// Named rules see the record being expanded
#[test]
fn test_catalog_rule_receives_identifier() {
    let engine = engine_from(TREES);
    let mut bag = Piggybag::new();
    bag.insert(PIGGYBAG_PARENT_NODE_ID.to_string(), "root".to_string());

    let elements = engine
        .expand_children(&Identifier::record("Page", "about"), &bag)
        .unwrap();
    let labels: Vec<&str> = elements.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["v2", "v1"]);
    assert_eq!(elements[0].id, "about@2");
}

/// Perspective root shows the shared group first, then the attached tree's top level
#[test]
fn test_perspective_root_attachments_from_file() {
    let engine = engine_from(TREES);
    let merged = engine
        .merged_root_attachments(&Identifier::perspective("Root"), &Piggybag::new())
        .unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].elements[0].id, "perspective:library");
    assert_eq!(merged[0].elements[0].icon.as_deref(), Some("books"));
    let attached: Vec<&str> = merged[1].elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(attached, vec!["content/pages"]);
    assert_eq!(merged[1].position, Position::Top);

    let children = engine
        .expand_children(&Identifier::perspective("library"), &Piggybag::new())
        .unwrap();
    let ids: Vec<&str> = children.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["content/pages", "media/images"]);
}

/// Record attachments bind one key only
#[test]
fn test_record_attachment_matches_single_key() {
    let engine = engine_from(TREES);
    let home = engine
        .merged_root_attachments(&Identifier::record("Page", "home"), &Piggybag::new())
        .unwrap();
    assert_eq!(home.len(), 1);
    assert_eq!(home[0].position, Position::Bottom);

    let other = engine
        .merged_root_attachments(&Identifier::record("Page", "other"), &Piggybag::new())
        .unwrap();
    assert!(other.is_empty());
}

/// Invalid definitions are rejected at load time
#[test]
fn test_invalid_definitions_rejected() {
    let cycle = r#"
[[trees]]
id = "loop"
root = { id = "root", label = "Root" }
nodes = [
    { id = "a", parent = "b", label = "A" },
    { id = "b", parent = "a", label = "B" },
]
"#;
    let file = DefinitionFile::from_toml_str(cycle).unwrap();
    assert!(matches!(
        file.build_registry(&catalog()),
        Err(DefinitionError::Unreachable { .. })
    ));

    let duplicate = format!("{}\n[[trees]]\nid = \"media\"\nroot = {{ id = \"r\", label = \"R\" }}\n", TREES);
    let file = DefinitionFile::from_toml_str(&duplicate).unwrap();
    assert!(matches!(
        file.build_registry(&catalog()),
        Err(DefinitionError::DuplicateTree(id)) if id == "media"
    ));
}

/// The CLI route table loads config and definitions from the workspace
#[test]
fn test_run_context_from_workspace_files() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("canopy.toml");
    fs::write(
        &config_path,
        "provider_name = \"sidebar\"\ndefinitions = \"trees.toml\"\n",
    )
    .unwrap();
    let no_rules = TREES.replace(", rule = \"versions\"", "");
    fs::write(temp.path().join("trees.toml"), no_rules).unwrap();

    let context =
        RunContext::new(temp.path().to_path_buf(), Some(config_path.clone()), None).unwrap();
    assert_eq!(context.engine().provider_name(), "sidebar");

    let report = context
        .execute(&Commands::Check {
            format: "json".to_string(),
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["provider_name"], "sidebar");
    assert_eq!(value["trees"].as_array().unwrap().len(), 2);
    assert_eq!(value["shared_roots"][0]["members"][1], "media");

    let missing = RunContext::new(
        temp.path().to_path_buf(),
        Some(config_path),
        Some("absent.toml".into()),
    );
    assert!(matches!(missing, Err(ApiError::ConfigError(_))));
}
