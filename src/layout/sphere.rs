//! Force-directed placement on and around a sphere.
//!
//! Seeding is deterministic, so relaxing the same graph twice yields the same
//! snapshot. The relax pass runs to its fixed iteration budget synchronously.

use std::f32::consts::{PI, TAU};
use std::time::Instant;

use glam::Vec3;
use tracing::debug;

use crate::config::SimulationParams;
use crate::graph::{CollabGraph, GraphKey};

/// Relaxed 3-D positions for one graph structure. Replaced wholesale, never
/// edited in place.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSnapshot {
    key: GraphKey,
    positions: Vec<Vec3>,
}

impl LayoutSnapshot {
    pub fn key(&self) -> GraphKey {
        self.key
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Equal-area placement of `count` points on a sphere, indexed by node order.
pub fn seed_positions(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count as f32;
    (0..count)
        .map(|index| {
            let phi = (-1.0 + (2.0 * index as f32 + 1.0) / n).clamp(-1.0, 1.0).acos();
            let theta = (n * PI).sqrt() * phi;
            Vec3::new(
                radius * theta.cos() * phi.sin(),
                radius * phi.cos(),
                radius * theta.sin() * phi.sin(),
            )
        })
        .collect()
}

fn fallback_direction(i: usize, j: usize) -> Vec3 {
    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * TAU;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

struct Relaxation<'a> {
    params: &'a SimulationParams,
    springs: Vec<(usize, usize)>,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    forces: Vec<Vec3>,
}

impl Relaxation<'_> {
    fn step(&mut self) {
        let node_count = self.positions.len();
        let params = self.params;
        self.forces.fill(Vec3::ZERO);

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let delta = self.positions[i] - self.positions[j];
                let distance_sq = delta.length_squared();
                let distance = distance_sq.sqrt();
                let direction = if distance > 0.0001 {
                    delta / distance
                } else {
                    fallback_direction(i, j)
                };

                let repulsion = params.repulsion / (distance_sq + params.softening);
                self.forces[i] += direction * repulsion;
                self.forces[j] -= direction * repulsion;
            }
        }

        for &(source, target) in &self.springs {
            let pull = (self.positions[source] - self.positions[target]) * params.spring;
            self.forces[source] -= pull;
            self.forces[target] += pull;
        }

        let mut centroid = Vec3::ZERO;
        for index in 0..node_count {
            let velocity = ((self.velocities[index] + self.forces[index]) * params.damping)
                .clamp_length_max(params.max_speed);
            self.velocities[index] = velocity;
            self.positions[index] += velocity;
            centroid += self.positions[index];
        }

        centroid /= node_count as f32;
        if centroid.length_squared() > 0.000_001 {
            for position in &mut self.positions {
                *position -= centroid;
            }
        }
    }
}

/// Runs the full relax pass for `graph` from the deterministic seed.
pub fn relax(graph: &CollabGraph, params: &SimulationParams) -> LayoutSnapshot {
    let started = Instant::now();
    let node_count = graph.node_count();
    let positions = seed_positions(node_count, params.sphere_radius);

    if node_count < 2 {
        return LayoutSnapshot {
            key: graph.key(),
            positions,
        };
    }

    let springs = graph
        .edges
        .iter()
        .filter(|edge| edge.source != edge.target)
        .map(|edge| (edge.source, edge.target))
        .collect();

    let mut relaxation = Relaxation {
        params,
        springs,
        positions,
        velocities: vec![Vec3::ZERO; node_count],
        forces: vec![Vec3::ZERO; node_count],
    };
    for _ in 0..params.iterations {
        relaxation.step();
    }

    debug!(
        nodes = node_count,
        iterations = params.iterations,
        elapsed_us = started.elapsed().as_micros() as u64,
        "relaxed sphere layout"
    );

    LayoutSnapshot {
        key: graph.key(),
        positions: relaxation.positions,
    }
}

/// Holds the last relaxed snapshot and reruns the relax pass only when the
/// graph structure or the simulation parameters change.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(SimulationParams, LayoutSnapshot)>,
    relax_runs: usize,
}

impl LayoutCache {
    pub fn get_or_relax(
        &mut self,
        graph: &CollabGraph,
        params: &SimulationParams,
    ) -> &LayoutSnapshot {
        let key = graph.key();
        let snapshot = match self.entry.take() {
            Some((cached_params, snapshot))
                if snapshot.key == key && cached_params == *params =>
            {
                debug!("sphere layout cache hit");
                snapshot
            }
            _ => {
                self.relax_runs += 1;
                relax(graph, params)
            }
        };

        let (_, snapshot) = self.entry.insert((*params, snapshot));
        snapshot
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn relax_runs(&self) -> usize {
        self.relax_runs
    }
}
