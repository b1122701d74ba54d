use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::model::{Relation, UNKNOWN_GROUP, WorkItem};

/// Structural identity of a graph: node ids plus `(source, target, relation)`
/// edges. Edge counts do not contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphKey(u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub group: String,
    pub degree: usize,
    pub pair_count: usize,
    pub wait_out: usize,
    pub wait_in: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub relation: Relation,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollabGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
    #[serde(skip)]
    adjacency: Vec<Vec<usize>>,
}

impl CollabGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Nodes sharing at least one edge with `index`, in either direction.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges_touching(&self, index: usize) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |edge| edge.source == index || edge.target == index)
    }

    /// Distinct node groups in first-seen order.
    pub fn groups(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| seen.insert(node.group.as_str()))
            .map(|node| node.group.clone())
            .collect()
    }

    pub fn key(&self) -> GraphKey {
        let mut hasher = DefaultHasher::new();
        self.nodes.len().hash(&mut hasher);
        for node in &self.nodes {
            node.id.hash(&mut hasher);
        }
        self.edges.len().hash(&mut hasher);
        for edge in &self.edges {
            edge.source.hash(&mut hasher);
            edge.target.hash(&mut hasher);
            edge.relation.hash(&mut hasher);
        }
        GraphKey(hasher.finish())
    }
}

/// Builds the aggregated collaboration graph for `items`.
///
/// Nodes appear in order of first mention, as owner or as collaborator. Each
/// distinct `(owner, collaborator, relation)` triple becomes one edge whose
/// count is the number of raw occurrences.
pub fn build_graph(items: &[WorkItem]) -> CollabGraph {
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut owner_group: HashMap<usize, &str> = HashMap::new();
    let mut edge_index: HashMap<(usize, usize, &Relation), usize> = HashMap::new();
    let mut edges: Vec<Edge> = Vec::new();

    for item in items {
        let owner = intern(&mut index_by_id, &item.owner);
        if let Some(group) = item.group() {
            owner_group.entry(owner).or_insert(group);
        }

        for collaborator in item.references() {
            let target = intern(&mut index_by_id, &collaborator.name);
            let key = (owner, target, &collaborator.relation);
            match edge_index.get(&key) {
                Some(&existing) => edges[existing].count += 1,
                None => {
                    edge_index.insert(key, edges.len());
                    edges.push(Edge {
                        source: owner,
                        target,
                        relation: collaborator.relation.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    let mut names = vec![String::new(); index_by_id.len()];
    for (name, &index) in &index_by_id {
        names[index] = name.clone();
    }

    let mut nodes = names
        .into_iter()
        .enumerate()
        .map(|(index, id)| Node {
            id,
            group: owner_group
                .get(&index)
                .map(|group| (*group).to_owned())
                .unwrap_or_else(|| UNKNOWN_GROUP.to_owned()),
            degree: 0,
            pair_count: 0,
            wait_out: 0,
            wait_in: 0,
        })
        .collect::<Vec<_>>();

    let mut adjacency = vec![Vec::new(); nodes.len()];
    for edge in &edges {
        nodes[edge.source].degree += edge.count;
        if edge.target != edge.source {
            nodes[edge.target].degree += edge.count;
        }

        match edge.relation {
            Relation::Pair => nodes[edge.source].pair_count += edge.count,
            Relation::Wait => {
                nodes[edge.source].wait_out += edge.count;
                nodes[edge.target].wait_in += edge.count;
            }
            _ => {}
        }

        if edge.source != edge.target {
            adjacency[edge.source].push(edge.target);
            adjacency[edge.target].push(edge.source);
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    CollabGraph {
        nodes,
        edges,
        index_by_id,
        adjacency,
    }
}

fn intern(index_by_id: &mut HashMap<String, usize>, name: &str) -> usize {
    if let Some(&index) = index_by_id.get(name) {
        return index;
    }
    let index = index_by_id.len();
    index_by_id.insert(name.to_owned(), index);
    index
}
