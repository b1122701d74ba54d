use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{Collaborator, Relation, WorkItem};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of work items, found {0}")]
    Shape(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawCollaborator {
    #[serde(default)]
    name: String,
    #[serde(default)]
    relation: Option<String>,
}

pub fn load_items(path: &Path) -> Result<Vec<WorkItem>, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let items = parse_items(&raw)?;
    info!(path = %path.display(), items = items.len(), "loaded work items");
    Ok(items)
}

/// Parses a work-item array, skipping entries that cannot be used instead of
/// rejecting the whole collection.
pub fn parse_items(raw: &str) -> Result<Vec<WorkItem>, LoadError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let entries = match &parsed {
        Value::Array(entries) => entries,
        Value::Object(_) => return Err(LoadError::Shape("an object")),
        Value::Null => return Err(LoadError::Shape("null")),
        _ => return Err(LoadError::Shape("a scalar")),
    };

    let mut items = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if let Some(item) = parse_item(position, entry) {
            items.push(item);
        }
    }
    Ok(items)
}

fn parse_item(position: usize, entry: &Value) -> Option<WorkItem> {
    let Some(object) = entry.as_object() else {
        warn!(position, "skipping work item that is not an object");
        return None;
    };

    let owner = object
        .get("owner")
        .and_then(Value::as_str)
        .filter(|owner| !owner.trim().is_empty());
    let Some(owner) = owner else {
        warn!(position, "skipping work item without an owner");
        return None;
    };

    let text_field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    let mut collaborators = Vec::new();
    if let Some(raw_collaborators) = object.get("collaborators").and_then(Value::as_array) {
        for value in raw_collaborators {
            match RawCollaborator::deserialize(value) {
                Ok(raw) if !raw.name.trim().is_empty() => {
                    let relation = raw
                        .relation
                        .as_deref()
                        .map(Relation::parse)
                        .unwrap_or(Relation::Unspecified);
                    collaborators.push(Collaborator::new(raw.name, relation));
                }
                _ => warn!(position, owner, "skipping malformed collaborator entry"),
            }
        }
    }

    Some(WorkItem {
        owner: owner.to_owned(),
        group: text_field("group"),
        module: text_field("module"),
        collaborators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::metrics::{member_summary, outbound_wait_count, pair_count};

    #[test]
    fn empty_array_is_an_empty_collection() {
        assert!(parse_items("[]").expect("valid").is_empty());
    }

    #[test]
    fn malformed_collaborators_are_dropped_but_item_survives() {
        let items = parse_items(
            r#"[
                {"owner":"ana","group":"core","collaborators":[
                    {"name":"bo","relation":"pair"},
                    {"relation":"wait"},
                    42,
                    {"name":"cy","relation":"waiting-on"}
                ]}
            ]"#,
        )
        .expect("valid");

        assert_eq!(items.len(), 1);
        let names = items[0]
            .collaborators
            .iter()
            .map(|c| (c.name.as_str(), c.relation.clone()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec![("bo", Relation::Pair), ("cy", Relation::Wait)]);
    }

    #[test]
    fn items_without_owner_are_skipped() {
        let items = parse_items(
            r#"[{"group":"core"}, "junk", {"owner":"  "}, {"owner":"bo","module":""}]"#,
        )
        .expect("valid");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].owner, "bo");
        assert_eq!(items[0].module, None);
    }

    #[test]
    fn padded_names_are_kept_verbatim() {
        let items = parse_items(
            r#"[
                {"owner":"Ana","collaborators":[{"name":"Bo ","relation":"pair"}]},
                {"owner":"Bo","collaborators":[{"name":" Ana","relation":"pair"}]}
            ]"#,
        )
        .expect("valid");

        assert_eq!(items[0].collaborators[0].name, "Bo ");
        assert_eq!(items[1].collaborators[0].name, " Ana");

        let graph = build_graph(&items);
        let ids = graph.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["Ana", "Bo ", "Bo", " Ana"]);
    }

    #[test]
    fn missing_relation_does_not_count_as_pairing() {
        let items =
            parse_items(r#"[{"owner":"Ana","collaborators":[{"name":"Bo"}]}]"#).expect("valid");

        assert_eq!(items[0].collaborators[0].relation, Relation::Unspecified);
        assert_eq!(pair_count(&items, "Ana"), 0);
        assert_eq!(outbound_wait_count(&items, "Ana"), 0);
        assert_eq!(member_summary(&items, "Ana").total_collaborations, 1);
    }

    #[test]
    fn non_array_root_is_a_shape_error() {
        assert!(matches!(parse_items("{}"), Err(LoadError::Shape(_))));
        assert!(matches!(parse_items("not json"), Err(LoadError::Json(_))));
    }
}
