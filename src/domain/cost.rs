//! Distance matrix over the sensed objects and the depot.

use nalgebra::DMatrix;

use super::Point;

/// Square matrix of travel costs between nodes. The diagonal is infinite so that no route can
/// use a self-loop. The last node is the depot, i.e. the agent's position at planning time.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMatrix(DMatrix<f64>);

impl CostMatrix {
    /// Builds the matrix for the given sensed points with `depot` appended as the last node.
    ///
    /// Returns `None` if nothing was sensed, as there is nothing to plan.
    pub fn build(points: &[Point], depot: Point) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let nodes = points
            .iter()
            .copied()
            .chain(std::iter::once(depot))
            .collect::<Vec<_>>();
        Some(Self::from_nodes(&nodes))
    }

    pub fn from_nodes(nodes: &[Point]) -> Self {
        Self(DMatrix::from_fn(nodes.len(), nodes.len(), |i, j| {
            if i == j {
                f64::INFINITY
            } else {
                nodes[i].distance(nodes[j])
            }
        }))
    }

    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn depot(&self) -> usize {
        self.size().saturating_sub(1)
    }

    pub fn cost(&self, from: usize, to: usize) -> Option<f64> {
        self.0.get((from, to)).copied()
    }

    pub fn is_symmetric(&self) -> bool {
        self.0 == self.0.transpose()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_cost_matrix_build_without_points() {
        assert_eq!(CostMatrix::build(&[], Point::new(1, 1)), None);
    }

    #[test]
    fn test_cost_matrix_build() {
        let matrix = CostMatrix::build(&[Point::new(3, 0), Point::new(3, 4)], Point::new(0, 0))
            .unwrap();

        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.depot(), 2);
        assert_abs_diff_eq!(matrix.cost(0, 1).unwrap(), 4.0);
        assert_abs_diff_eq!(matrix.cost(0, 2).unwrap(), 3.0);
        assert_abs_diff_eq!(matrix.cost(1, 2).unwrap(), 5.0);
        assert_eq!(matrix.cost(3, 0), None);
    }

    #[test]
    fn test_cost_matrix_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points = (0..20)
            .map(|_| Point::new(rng.random_range(-500..500), rng.random_range(-500..500)))
            .collect::<Vec<_>>();
        let matrix = CostMatrix::build(&points, Point::new(0, 0)).unwrap();

        assert_eq!(matrix.size(), 21);
        assert!(matrix.is_symmetric());
        for i in 0..matrix.size() {
            assert_eq!(matrix.cost(i, i), Some(f64::INFINITY));
            for j in (0..matrix.size()).filter(|j| *j != i) {
                assert!(matrix.cost(i, j).unwrap() >= 0.0);
            }
        }
    }

    #[test]
    fn test_cost_matrix_duplicate_points() {
        let matrix = CostMatrix::build(&[Point::new(2, 2)], Point::new(2, 2)).unwrap();
        assert_eq!(matrix.cost(0, 1), Some(0.0));
        assert_eq!(matrix.cost(1, 0), Some(0.0));
    }
}
