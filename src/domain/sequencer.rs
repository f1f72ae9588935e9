//! Walks a committed route edge by edge to select travel targets.

use super::{Point, Position, Route};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
    /// The route continues to the given node.
    Next(usize),
    /// The next edge leads back to the depot.
    Complete,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetSequencer {
    route: Route,
    depot: usize,
    current: usize,
}

impl TargetSequencer {
    /// Starts at the node the route leaves the depot for. The depot is the last node of the
    /// route.
    pub fn start(route: Route) -> Option<Self> {
        if route.is_empty() {
            return None;
        }
        let depot = route.len() - 1;
        let current = route.successor(depot)?;
        Some(Self {
            route,
            depot,
            current,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn depot(&self) -> usize {
        self.depot
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Follows the edge leaving the current target. The current target is kept once the tour is
    /// complete.
    pub fn advance(&mut self) -> Advance {
        match self.route.successor(self.current) {
            Some(next) if next != self.depot => {
                self.current = next;
                Advance::Next(next)
            }
            _ => Advance::Complete,
        }
    }
}

/// Whether an agent of the given diameter has reached the target. The check is done per axis
/// against half the diameter (integer division), not on the Euclidean distance.
pub fn has_arrived(position: Point, target: Position, diameter: u32) -> bool {
    let half = f64::from(diameter / 2);
    (target.x() - f64::from(position.x())).abs() <= half
        && (target.y() - f64::from(position.y())).abs() <= half
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_sequencer_start() {
        let sequencer = TargetSequencer::start(Route::from_tour(&[3, 1, 0, 2]).unwrap()).unwrap();
        assert_eq!(sequencer.current(), 1);
        assert_eq!(sequencer.depot(), 3);
    }

    #[test]
    fn test_sequencer_start_without_route() {
        assert_eq!(TargetSequencer::start(Route::default()), None);
    }

    #[test]
    fn test_sequencer_advance() {
        let mut sequencer =
            TargetSequencer::start(Route::from_tour(&[3, 1, 0, 2]).unwrap()).unwrap();

        assert_eq!(sequencer.advance(), Advance::Next(0));
        assert_eq!(sequencer.advance(), Advance::Next(2));
        assert_eq!(sequencer.advance(), Advance::Complete);
        assert_eq!(sequencer.current(), 2);
        assert_eq!(sequencer.advance(), Advance::Complete);
        assert_eq!(sequencer.current(), 2);
    }

    #[test]
    fn test_sequencer_single_target() {
        let mut sequencer = TargetSequencer::start(Route::from_tour(&[1, 0]).unwrap()).unwrap();
        assert_eq!(sequencer.current(), 0);
        assert_eq!(sequencer.advance(), Advance::Complete);
    }

    #[rstest]
    #[case::inside(Point::new(10, 10), Position::new(11.0, 11.0), 4, true)]
    #[case::corner(Point::new(10, 10), Position::new(12.0, 12.0), 4, true)]
    #[case::edge(Point::new(10, 10), Position::new(11.0, 12.0), 4, true)]
    #[case::negative_corner(Point::new(10, 10), Position::new(8.0, 8.0), 4, true)]
    #[case::outside_x(Point::new(10, 10), Position::new(13.0, 10.0), 4, false)]
    #[case::outside_y(Point::new(10, 10), Position::new(10.0, 7.0), 4, false)]
    #[case::odd_diameter(Point::new(10, 10), Position::new(12.5, 10.0), 5, false)]
    #[case::zero_half(Point::new(10, 10), Position::new(10.0, 10.0), 1, true)]
    #[case::zero_half_miss(Point::new(10, 10), Position::new(11.0, 10.0), 1, false)]
    #[case::radially_outside(Point::new(0, 0), Position::new(2.0, 2.0), 4, true)]
    fn test_has_arrived(
        #[case] position: Point,
        #[case] target: Position,
        #[case] diameter: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(has_arrived(position, target, diameter), expected);
    }
}
