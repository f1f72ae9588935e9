//! Visiting order over the nodes of a cost matrix.
//!
//! A route is a closed tour: every node has exactly one outgoing and one incoming edge, and the
//! tour starts and ends at the depot. Small matrices are solved exactly with the Held-Karp
//! dynamic program, larger ones with a nearest-neighbour tour improved by 2-opt moves.

use std::{cmp::Ordering, fmt};

use thiserror::Error;

use super::CostMatrix;

/// Matrices up to this size are solved exactly by default.
pub const EXACT_LIMIT: usize = 12;

/// The exact solver needs `2^(n-1) * (n-1)` table entries, so its limit is capped.
const MAX_EXACT_LIMIT: usize = 16;
const MAX_IMPROVEMENT_PASSES: usize = 1000;
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

impl Edge {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Route {
    edges: Vec<Edge>,
}

impl Route {
    /// Validates that `edges` form a complete assignment over `size` nodes.
    pub fn from_edges(edges: Vec<Edge>, size: usize) -> Result<Self, RouteError> {
        if size < 2 {
            return Err(RouteError::TooFewNodes(size));
        }
        if edges.len() != size {
            return Err(RouteError::EdgeCount {
                expected: size,
                actual: edges.len(),
            });
        }

        let mut outgoing = vec![false; size];
        let mut incoming = vec![false; size];
        for edge in &edges {
            if edge.from >= size || edge.to >= size || edge.from == edge.to {
                return Err(RouteError::InvalidEdge(*edge));
            }
            if std::mem::replace(&mut outgoing[edge.from], true) {
                return Err(RouteError::DuplicateSource(edge.from));
            }
            if std::mem::replace(&mut incoming[edge.to], true) {
                return Err(RouteError::DuplicateDestination(edge.to));
            }
        }

        Ok(Self { edges })
    }

    /// Closed tour visiting the nodes in the given order.
    pub fn from_tour(tour: &[usize]) -> Result<Self, RouteError> {
        let edges = tour
            .iter()
            .zip(tour.iter().cycle().skip(1))
            .map(|(from, to)| Edge::new(*from, *to))
            .collect();
        Self::from_edges(edges, tour.len())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Destination of the edge leaving `from`.
    pub fn successor(&self, from: usize) -> Option<usize> {
        self.edges.iter().find(|e| e.from == from).map(|e| e.to)
    }

    pub fn cost(&self, matrix: &CostMatrix) -> f64 {
        self.edges.iter().map(|e| cost(matrix, e.from, e.to)).sum()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{edge}")?;
        }
        Ok(())
    }
}

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum RouteError {
    #[error("at least 2 nodes are required, got {0}")]
    TooFewNodes(usize),
    #[error("expected {expected} edges, got {actual}")]
    EdgeCount { expected: usize, actual: usize },
    #[error("invalid edge {0}")]
    InvalidEdge(Edge),
    #[error("node {0} has more than one outgoing edge")]
    DuplicateSource(usize),
    #[error("node {0} has more than one incoming edge")]
    DuplicateDestination(usize),
}

/// Computes a route over all nodes of a cost matrix. Identical matrices must yield identical
/// routes.
pub trait RouteSolver {
    fn solve(&self, matrix: &CostMatrix) -> Result<Route, RouteError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TourSolver {
    exact_limit: usize,
}

impl TourSolver {
    pub fn new(exact_limit: usize) -> Self {
        Self {
            exact_limit: exact_limit.min(MAX_EXACT_LIMIT),
        }
    }
}

impl Default for TourSolver {
    fn default() -> Self {
        Self::new(EXACT_LIMIT)
    }
}

impl RouteSolver for TourSolver {
    fn solve(&self, matrix: &CostMatrix) -> Result<Route, RouteError> {
        let size = matrix.size();
        if size < 2 {
            return Err(RouteError::TooFewNodes(size));
        }

        let tour = if size <= self.exact_limit {
            exact_tour(matrix)
        } else {
            let mut tour = nearest_neighbour_tour(matrix);
            improve(matrix, &mut tour);
            tour
        };

        Route::from_tour(&canonical(matrix, tour))
    }
}

fn cost(matrix: &CostMatrix, from: usize, to: usize) -> f64 {
    matrix.cost(from, to).unwrap_or(f64::INFINITY)
}

/// Held-Karp over subsets of the non-depot nodes. `best[visited][last]` is the cheapest path
/// leaving the depot, covering `visited` and ending in `last`.
fn exact_tour(matrix: &CostMatrix) -> Vec<usize> {
    let depot = matrix.depot();
    let count = depot;
    let full = (1usize << count) - 1;

    let mut best = vec![vec![f64::INFINITY; count]; full + 1];
    let mut parent = vec![vec![usize::MAX; count]; full + 1];
    for node in 0..count {
        best[1 << node][node] = cost(matrix, depot, node);
    }

    for visited in 1..=full {
        for last in (0..count).filter(|n| visited & (1 << *n) != 0) {
            let current = best[visited][last];
            if current.is_infinite() {
                continue;
            }
            for next in (0..count).filter(|n| visited & (1 << *n) == 0) {
                let candidate = current + cost(matrix, last, next);
                let extended = visited | (1 << next);
                if candidate < best[extended][next] {
                    best[extended][next] = candidate;
                    parent[extended][next] = last;
                }
            }
        }
    }

    let closed = |node: usize| best[full][node] + cost(matrix, node, depot);
    let mut last = (0..count)
        .min_by(|a, b| closed(*a).total_cmp(&closed(*b)))
        .unwrap_or_default();

    let mut order = Vec::with_capacity(depot + 1);
    let mut visited = full;
    while visited != 0 {
        order.push(last);
        let previous = parent[visited][last];
        visited &= !(1 << last);
        last = previous;
    }
    order.push(depot);
    order.reverse();
    order
}

/// Greedy tour from the depot. Ties go to the lower node index.
fn nearest_neighbour_tour(matrix: &CostMatrix) -> Vec<usize> {
    let depot = matrix.depot();
    let mut remaining = (0..depot).collect::<Vec<_>>();
    let mut tour = vec![depot];
    let mut current = depot;

    while !remaining.is_empty() {
        let idx = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                cost(matrix, current, **a).total_cmp(&cost(matrix, current, **b))
            })
            .map(|(idx, _)| idx)
            .unwrap_or_default();
        current = remaining.remove(idx);
        tour.push(current);
    }

    tour
}

/// 2-opt moves until no move shortens the tour. The depot stays in front.
fn improve(matrix: &CostMatrix, tour: &mut [usize]) {
    let size = tour.len();
    for _ in 0..MAX_IMPROVEMENT_PASSES {
        let mut improved = false;
        for i in 1..size.saturating_sub(1) {
            for k in i + 1..size {
                let (a, b) = (tour[i - 1], tour[i]);
                let (c, d) = (tour[k], tour[(k + 1) % size]);
                let delta = cost(matrix, a, c) + cost(matrix, b, d)
                    - cost(matrix, a, b)
                    - cost(matrix, c, d);
                if delta < -IMPROVEMENT_EPSILON {
                    tour[i..=k].reverse();
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

/// A tour and its reverse cost the same on a symmetric matrix. Start towards the nearer end,
/// and on a tie pick the lexicographically smaller visiting order, so the direction does not
/// depend on the search.
fn canonical(matrix: &CostMatrix, mut tour: Vec<usize>) -> Vec<usize> {
    let (Some(&depot), Some(&first), Some(&last)) = (tour.first(), tour.get(1), tour.last())
    else {
        return tour;
    };
    let reverse = match cost(matrix, depot, last).total_cmp(&cost(matrix, depot, first)) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => tour[1..].iter().rev().lt(tour[1..].iter()),
    };
    if reverse {
        tour[1..].reverse();
    }
    tour
}
