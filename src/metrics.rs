//! Per-member and per-group statistics over one snapshot of work items.
//!
//! Every function here is pure and recomputes from `items`; nothing is cached
//! between calls except inside [`TeamSnapshot`], which only bundles results.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::graph::{CollabGraph, build_graph};
use crate::model::{Relation, UNKNOWN_GROUP, WorkItem};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollaboratorTally {
    pub name: String,
    pub total: usize,
    pub pair: usize,
    pub wait: usize,
    pub other: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemberSummary {
    pub member: String,
    pub group: String,
    pub pair_count: usize,
    pub wait_out: usize,
    pub wait_in: usize,
    pub cross_group_score: u32,
    pub cross_module_score: u32,
    pub total_collaborations: usize,
    pub collaborators: Vec<CollaboratorTally>,
}

impl MemberSummary {
    pub fn top_collaborator(&self) -> Option<&CollaboratorTally> {
        self.collaborators.first()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadRow {
    pub member: String,
    pub group: String,
    pub pair: usize,
    pub waiting_on: usize,
    pub waited_on: usize,
    pub review: usize,
    pub handoff: usize,
    pub other: usize,
    pub total_load: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BottleneckNode {
    pub member: String,
    pub group: String,
    pub inbound: usize,
    pub outbound: usize,
    /// Inbound count relative to the team maximum, 0-100.
    pub intensity: u32,
    pub waiters: Vec<String>,
    pub blocking_on: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub source: String,
    pub target: String,
    pub pair: usize,
    pub wait: usize,
    pub total: usize,
}

/// Dense `groups x groups` collaboration counts, row-major by source group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GroupMatrix {
    pub groups: Vec<String>,
    pub cells: Vec<MatrixCell>,
}

impl GroupMatrix {
    pub fn cell(&self, source: &str, target: &str) -> Option<&MatrixCell> {
        let row = self.groups.iter().position(|group| group == source)?;
        let column = self.groups.iter().position(|group| group == target)?;
        self.cells.get(row * self.groups.len() + column)
    }

    pub fn max_total(&self) -> usize {
        self.cells.iter().map(|cell| cell.total).max().unwrap_or(0)
    }
}

fn owned_by<'a>(items: &'a [WorkItem], member: &'a str) -> impl Iterator<Item = &'a WorkItem> {
    items.iter().filter(move |item| item.owner == member)
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().min(100.0) as u32
}

/// Owner name to the group of their first item that carries one.
fn group_index(items: &[WorkItem]) -> HashMap<&str, &str> {
    let mut groups = HashMap::new();
    for item in items {
        if let Some(group) = item.group() {
            groups.entry(item.owner.as_str()).or_insert(group);
        }
    }
    groups
}

fn group_of<'a>(groups: &HashMap<&str, &'a str>, member: &str) -> &'a str {
    groups.get(member).copied().unwrap_or(UNKNOWN_GROUP)
}

pub fn pair_count(items: &[WorkItem], member: &str) -> usize {
    owned_by(items, member)
        .flat_map(WorkItem::references)
        .filter(|collaborator| collaborator.relation.is_pair())
        .count()
}

pub fn outbound_wait_count(items: &[WorkItem], member: &str) -> usize {
    owned_by(items, member)
        .flat_map(WorkItem::references)
        .filter(|collaborator| collaborator.relation.is_wait())
        .count()
}

/// Times `member` is named as the target of someone else's wait relation.
pub fn inbound_wait_count(items: &[WorkItem], member: &str) -> usize {
    items
        .iter()
        .flat_map(WorkItem::references)
        .filter(|collaborator| collaborator.relation.is_wait() && collaborator.name == member)
        .count()
}

/// Wait targets of `member` with occurrence counts, most frequent first.
pub fn outbound_wait_targets(items: &[WorkItem], member: &str) -> Vec<(String, usize)> {
    let mut targets: Vec<(String, usize)> = Vec::new();
    for collaborator in owned_by(items, member).flat_map(WorkItem::references) {
        if !collaborator.relation.is_wait() {
            continue;
        }
        match targets.iter_mut().find(|(name, _)| *name == collaborator.name) {
            Some((_, count)) => *count += 1,
            None => targets.push((collaborator.name.clone(), 1)),
        }
    }
    targets.sort_by(|a, b| b.1.cmp(&a.1));
    targets
}

pub fn cross_group_score(items: &[WorkItem], member: &str) -> u32 {
    let groups = group_index(items);
    let own_group = group_of(&groups, member);

    let mut total = 0usize;
    let mut crossing = 0usize;
    for collaborator in owned_by(items, member).flat_map(WorkItem::references) {
        total += 1;
        if group_of(&groups, &collaborator.name) != own_group {
            crossing += 1;
        }
    }
    percent(crossing, total)
}

/// Share of the modules touched by `member`'s collaborators that `member`
/// never touches personally. Deliberately asymmetric.
pub fn cross_module_score(items: &[WorkItem], member: &str) -> u32 {
    let own_modules = owned_by(items, member)
        .filter_map(WorkItem::module)
        .collect::<HashSet<_>>();
    let collaborators = owned_by(items, member)
        .flat_map(WorkItem::references)
        .map(|collaborator| collaborator.name.as_str())
        .collect::<HashSet<_>>();
    let collaborator_modules = items
        .iter()
        .filter(|item| collaborators.contains(item.owner.as_str()))
        .filter_map(WorkItem::module)
        .collect::<HashSet<_>>();

    let foreign = collaborator_modules
        .iter()
        .filter(|module| !own_modules.contains(*module))
        .count();
    percent(foreign, collaborator_modules.len())
}

fn collaborator_tallies(items: &[WorkItem], member: &str) -> Vec<CollaboratorTally> {
    let mut tallies: Vec<CollaboratorTally> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for collaborator in owned_by(items, member).flat_map(WorkItem::references) {
        let index = *index_by_name
            .entry(collaborator.name.as_str())
            .or_insert_with(|| {
                tallies.push(CollaboratorTally {
                    name: collaborator.name.clone(),
                    ..CollaboratorTally::default()
                });
                tallies.len() - 1
            });
        let tally = &mut tallies[index];
        tally.total += 1;
        match collaborator.relation {
            Relation::Pair => tally.pair += 1,
            Relation::Wait => tally.wait += 1,
            _ => tally.other += 1,
        }
    }

    // stable sort keeps first-seen order among ties
    tallies.sort_by(|a, b| b.total.cmp(&a.total));
    tallies
}

pub fn member_summary(items: &[WorkItem], member: &str) -> MemberSummary {
    let groups = group_index(items);
    let collaborators = collaborator_tallies(items, member);
    let total_collaborations = collaborators.iter().map(|tally| tally.total).sum();

    MemberSummary {
        member: member.to_owned(),
        group: group_of(&groups, member).to_owned(),
        pair_count: pair_count(items, member),
        wait_out: outbound_wait_count(items, member),
        wait_in: inbound_wait_count(items, member),
        cross_group_score: cross_group_score(items, member),
        cross_module_score: cross_module_score(items, member),
        total_collaborations,
        collaborators,
    }
}

/// Mean pair count across distinct owners.
pub fn team_pair_average(items: &[WorkItem]) -> f64 {
    let mut owners = Vec::new();
    let mut seen = HashSet::new();
    for item in items {
        if seen.insert(item.owner.as_str()) {
            owners.push(item.owner.as_str());
        }
    }
    if owners.is_empty() {
        return 0.0;
    }

    let total = owners
        .iter()
        .map(|owner| pair_count(items, owner))
        .sum::<usize>();
    total as f64 / owners.len() as f64
}

fn heatmap_rows(graph: &CollabGraph) -> Vec<LoadRow> {
    let mut rows = graph
        .nodes
        .iter()
        .map(|node| LoadRow {
            member: node.id.clone(),
            group: node.group.clone(),
            ..LoadRow::default()
        })
        .collect::<Vec<_>>();

    for edge in &graph.edges {
        let source = &mut rows[edge.source];
        match edge.relation {
            Relation::Pair => source.pair += edge.count,
            Relation::Wait => source.waiting_on += edge.count,
            Relation::Review => source.review += edge.count,
            Relation::Handoff => source.handoff += edge.count,
            Relation::Other(_) | Relation::Unspecified => source.other += edge.count,
        }
        if edge.relation.is_wait() {
            rows[edge.target].waited_on += edge.count;
        }
    }

    for row in &mut rows {
        row.total_load =
            row.pair + row.waiting_on + row.waited_on + row.review + row.handoff + row.other;
    }
    rows.sort_by(|a, b| b.total_load.cmp(&a.total_load));
    rows
}

/// One row per member, heaviest load first. Being waited on counts as load.
pub fn load_heatmap(items: &[WorkItem]) -> Vec<LoadRow> {
    heatmap_rows(&build_graph(items))
}

fn bottlenecks_for(graph: &CollabGraph) -> Vec<BottleneckNode> {
    let mut entries = graph
        .nodes
        .iter()
        .map(|node| BottleneckNode {
            member: node.id.clone(),
            group: node.group.clone(),
            inbound: node.wait_in,
            outbound: node.wait_out,
            ..BottleneckNode::default()
        })
        .collect::<Vec<_>>();

    for edge in graph.edges.iter().filter(|edge| edge.relation.is_wait()) {
        let waiter = graph.nodes[edge.source].id.clone();
        let blocker = graph.nodes[edge.target].id.clone();
        entries[edge.target].waiters.push(waiter);
        entries[edge.source].blocking_on.push(blocker);
    }

    let max_inbound = entries
        .iter()
        .map(|entry| entry.inbound)
        .max()
        .unwrap_or(0)
        .max(1);
    for entry in &mut entries {
        entry.intensity = percent(entry.inbound, max_inbound);
    }

    entries.sort_by(|a, b| b.inbound.cmp(&a.inbound));
    entries
}

/// Every member ranked by how often others wait on them.
pub fn bottleneck_ranking(items: &[WorkItem]) -> Vec<BottleneckNode> {
    bottlenecks_for(&build_graph(items))
}

fn matrix_for(graph: &CollabGraph) -> GroupMatrix {
    let groups = graph.groups();
    let position = groups
        .iter()
        .enumerate()
        .map(|(index, group)| (group.as_str(), index))
        .collect::<HashMap<_, _>>();

    let mut cells = Vec::with_capacity(groups.len() * groups.len());
    for source in &groups {
        for target in &groups {
            cells.push(MatrixCell {
                source: source.clone(),
                target: target.clone(),
                ..MatrixCell::default()
            });
        }
    }

    for edge in &graph.edges {
        let row = position[graph.nodes[edge.source].group.as_str()];
        let column = position[graph.nodes[edge.target].group.as_str()];
        let cell = &mut cells[row * groups.len() + column];
        cell.total += edge.count;
        if edge.relation.is_pair() {
            cell.pair += edge.count;
        } else if edge.relation.is_wait() {
            cell.wait += edge.count;
        }
    }

    GroupMatrix { groups, cells }
}

pub fn group_matrix(items: &[WorkItem]) -> GroupMatrix {
    matrix_for(&build_graph(items))
}

/// All team-level aggregates for one item snapshot, computed together so the
/// graph is built once.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TeamSnapshot {
    #[serde(skip)]
    pub graph: CollabGraph,
    pub summaries: Vec<MemberSummary>,
    pub heatmap: Vec<LoadRow>,
    pub bottlenecks: Vec<BottleneckNode>,
    pub matrix: GroupMatrix,
    pub pair_average: f64,
    pub total_pair: usize,
    pub total_wait: usize,
}

impl TeamSnapshot {
    pub fn compute(items: &[WorkItem]) -> Self {
        let started = Instant::now();
        let graph = build_graph(items);
        let summaries = graph
            .nodes
            .iter()
            .map(|node| member_summary(items, &node.id))
            .collect::<Vec<_>>();
        let total_pair = graph.nodes.iter().map(|node| node.pair_count).sum();
        let total_wait = graph.nodes.iter().map(|node| node.wait_out).sum();

        let snapshot = Self {
            heatmap: heatmap_rows(&graph),
            bottlenecks: bottlenecks_for(&graph),
            matrix: matrix_for(&graph),
            pair_average: team_pair_average(items),
            summaries,
            total_pair,
            total_wait,
            graph,
        };
        debug!(
            items = items.len(),
            nodes = snapshot.graph.node_count(),
            edges = snapshot.graph.edge_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "computed team snapshot"
        );
        snapshot
    }

    pub fn summary(&self, member: &str) -> Option<&MemberSummary> {
        self.summaries.iter().find(|summary| summary.member == member)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Relation::{Handoff, Pair, Review, Wait};

    fn scenario() -> Vec<WorkItem> {
        vec![
            WorkItem::new("A", "X").with("B", Pair),
            WorkItem::new("B", "Y").with("A", Pair).with("C", Wait),
            WorkItem::new("C", "Y"),
        ]
    }

    #[test]
    fn scenario_counts() {
        let items = scenario();
        assert_eq!(inbound_wait_count(&items, "A"), 0);
        assert_eq!(inbound_wait_count(&items, "B"), 0);
        assert_eq!(inbound_wait_count(&items, "C"), 1);
        assert_eq!(outbound_wait_count(&items, "B"), 1);
        assert_eq!(pair_count(&items, "A"), 1);
        assert_eq!(cross_group_score(&items, "A"), 100);
    }

    #[test]
    fn scenario_bottleneck_intensity() {
        let ranking = bottleneck_ranking(&scenario());
        assert_eq!(ranking[0].member, "C");
        assert_eq!(ranking[0].intensity, 100);
        assert_eq!(ranking[0].waiters, vec!["B".to_owned()]);
        assert!(ranking[1..].iter().all(|entry| entry.intensity == 0));

        let b = ranking.iter().find(|entry| entry.member == "B").expect("B ranked");
        assert_eq!(b.blocking_on, vec!["C".to_owned()]);
    }

    #[test]
    fn empty_input_yields_empty_shapes() {
        let items: Vec<WorkItem> = Vec::new();
        assert_eq!(pair_count(&items, "A"), 0);
        assert_eq!(inbound_wait_count(&items, "A"), 0);
        assert_eq!(cross_group_score(&items, "A"), 0);
        assert_eq!(cross_module_score(&items, "A"), 0);
        assert!(load_heatmap(&items).is_empty());
        assert!(bottleneck_ranking(&items).is_empty());
        assert_eq!(group_matrix(&items), GroupMatrix::default());
        assert_eq!(team_pair_average(&items), 0.0);

        let summary = member_summary(&items, "A");
        assert_eq!(summary.group, UNKNOWN_GROUP);
        assert_eq!(summary.total_collaborations, 0);
        assert!(summary.collaborators.is_empty());
    }

    #[test]
    fn cross_group_score_rounds_mixed_references() {
        let items = vec![
            WorkItem::new("A", "X")
                .with("B", Pair)
                .with("C", Pair)
                .with("D", Wait),
            WorkItem::new("B", "X"),
            WorkItem::new("C", "Y"),
            WorkItem::new("D", "X"),
        ];
        assert_eq!(cross_group_score(&items, "A"), 33);
        assert_eq!(cross_group_score(&items, "B"), 0);
    }

    #[test]
    fn cross_module_score_is_share_of_foreign_collaborator_modules() {
        let items = vec![
            WorkItem::new("A", "X").with_module("api").with("B", Pair),
            WorkItem::new("A", "X").with_module("db").with("C", Pair),
            WorkItem::new("B", "X").with_module("api"),
            WorkItem::new("B", "X").with_module("ui"),
            WorkItem::new("C", "X").with_module("infra"),
            WorkItem::new("C", "X"),
        ];
        // collaborator modules {api, ui, infra}; {ui, infra} are foreign
        assert_eq!(cross_module_score(&items, "A"), 67);
        // B has no collaborators
        assert_eq!(cross_module_score(&items, "B"), 0);
    }

    #[test]
    fn cross_module_score_is_zero_when_collaborators_have_no_modules() {
        let items = vec![WorkItem::new("A", "X").with_module("api").with("Z", Pair)];
        assert_eq!(cross_module_score(&items, "A"), 0);
    }

    #[test]
    fn summary_ranks_collaborators_by_count_then_first_seen() {
        let items = vec![
            WorkItem::new("A", "X")
                .with("B", Pair)
                .with("C", Wait)
                .with("D", Review),
            WorkItem::new("A", "X").with("C", Pair).with("D", Handoff),
        ];
        let summary = member_summary(&items, "A");

        let order = summary
            .collaborators
            .iter()
            .map(|tally| (tally.name.as_str(), tally.total))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![("C", 2), ("D", 2), ("B", 1)]);
        assert_eq!(summary.total_collaborations, 5);
        assert_eq!(summary.pair_count, 2);
        assert_eq!(summary.wait_out, 1);
        assert_eq!(summary.collaborators[1].other, 2);
    }

    #[test]
    fn unknown_relations_count_generically() {
        let items = vec![
            WorkItem::new("A", "X")
                .with("B", Relation::parse("pre"))
                .with("B", Relation::parse("post")),
        ];
        let summary = member_summary(&items, "A");
        assert_eq!(summary.total_collaborations, 2);
        assert_eq!(summary.pair_count, 0);
        assert_eq!(summary.wait_out, 0);

        let rows = load_heatmap(&items);
        assert_eq!(rows[0].member, "A");
        assert_eq!(rows[0].other, 2);
        assert_eq!(rows[0].total_load, 2);
    }

    #[test]
    fn heatmap_counts_inbound_wait_as_load() {
        let items = vec![
            WorkItem::new("A", "X").with("C", Wait),
            WorkItem::new("B", "X").with("C", Wait).with("A", Pair),
            WorkItem::new("C", "Y"),
        ];
        let rows = load_heatmap(&items);

        let order = rows
            .iter()
            .map(|row| (row.member.as_str(), row.total_load))
            .collect::<Vec<_>>();
        // C is first mentioned before B, so it leads the tie
        assert_eq!(order, vec![("C", 2), ("B", 2), ("A", 1)]);
        let c = &rows[0];
        assert_eq!(c.waited_on, 2);
        assert_eq!(c.waiting_on, 0);
    }

    #[test]
    fn matrix_is_dense_with_zero_cells() {
        let matrix = group_matrix(&scenario());
        assert_eq!(matrix.groups, vec!["X".to_owned(), "Y".to_owned()]);
        assert_eq!(matrix.cells.len(), 4);

        let xy = matrix.cell("X", "Y").expect("cell");
        assert_eq!((xy.pair, xy.wait, xy.total), (1, 0, 1));
        let yy = matrix.cell("Y", "Y").expect("cell");
        assert_eq!((yy.pair, yy.wait, yy.total), (0, 1, 1));
        let xx = matrix.cell("X", "X").expect("cell");
        assert_eq!(xx.total, 0);
        assert_eq!(matrix.max_total(), 1);
    }

    #[test]
    fn wait_targets_are_ranked() {
        let items = vec![
            WorkItem::new("A", "X").with("B", Wait).with("C", Wait),
            WorkItem::new("A", "X").with("C", Wait).with("B", Pair),
        ];
        assert_eq!(
            outbound_wait_targets(&items, "A"),
            vec![("C".to_owned(), 2), ("B".to_owned(), 1)]
        );
    }

    #[test]
    fn team_average_uses_distinct_owners() {
        let items = vec![
            WorkItem::new("A", "X").with("B", Pair).with("C", Pair),
            WorkItem::new("A", "X").with("B", Pair),
            WorkItem::new("B", "X"),
        ];
        assert_eq!(team_pair_average(&items), 1.5);
    }

    #[test]
    fn snapshot_totals_match_functions() {
        let items = scenario();
        let snapshot = TeamSnapshot::compute(&items);

        assert_eq!(snapshot.total_pair, 2);
        assert_eq!(snapshot.total_wait, 1);
        assert_eq!(snapshot.summary("B"), Some(&member_summary(&items, "B")));
        assert_eq!(snapshot.heatmap, load_heatmap(&items));
        assert_eq!(snapshot.bottlenecks, bottleneck_ranking(&items));
    }
}
