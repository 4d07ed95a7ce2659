//! Cursor movement over the global hunk ordering.
//!
//! Movement always skips assigned hunks. Running into the first or last hunk
//! is reported back to the caller as [`Motion::Boundary`] so it can ask the
//! user before [`Navigator::rebound`] decides what happens next. A bump (a
//! move in the opposite direction triggered internally) that runs into the
//! other edge means nothing is left to assign.

use crate::index::HunkId;
use crate::store::AssignmentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Forward,
  Backward
}

impl Direction {
  pub fn opposite(self) -> Self {
    match self {
      Direction::Forward => Direction::Backward,
      Direction::Backward => Direction::Forward
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
  First,
  Last
}

impl Edge {
  pub fn message(self) -> &'static str {
    match self {
      Edge::First => "You're at the first hunk! ",
      Edge::Last => "You're at the last hunk! "
    }
  }

  /// Direction of travel that runs into this edge.
  pub fn direction(self) -> Direction {
    match self {
      Edge::First => Direction::Backward,
      Edge::Last => Direction::Forward
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
  /// The cursor rests on an unassigned hunk.
  Landed,
  /// The edge was reached on a user-initiated move; needs acknowledgement.
  Boundary(Edge),
  /// Every hunk is assigned.
  Complete
}

#[derive(Debug, Clone)]
pub struct Navigator {
  target: usize,
  total:  usize
}

impl Navigator {
  pub fn new(total: usize) -> Self {
    Self { target: 0, total }
  }

  pub fn target(&self) -> usize {
    self.target
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn advance(&mut self, store: &AssignmentStore, bumping: bool) -> Motion {
    self.step(Direction::Forward, bumping, store)
  }

  pub fn retreat(&mut self, store: &AssignmentStore, bumping: bool) -> Motion {
    self.step(Direction::Backward, bumping, store)
  }

  /// Moves at least once, then keeps moving while the cursor sits on an assigned hunk.
  pub fn step(&mut self, direction: Direction, bumping: bool, store: &AssignmentStore) -> Motion {
    if self.total == 0 {
      return Motion::Complete;
    }

    let mut first = true;
    while first || self.is_assigned(store, self.target) {
      first = false;

      if let Some(edge) = self.edge_ahead(direction) {
        log::debug!("Reached {edge:?} hunk (bumping: {bumping})");
        return if bumping { Motion::Complete } else { Motion::Boundary(edge) };
      }

      match direction {
        Direction::Forward => self.target += 1,
        Direction::Backward => self.target -= 1
      }
    }

    Motion::Landed
  }

  /// Settles after the user acknowledged a boundary: stay put on an
  /// unassigned hunk, otherwise bump back the other way.
  pub fn rebound(&mut self, edge: Edge, store: &AssignmentStore) -> Motion {
    if self.is_assigned(store, self.target) {
      self.step(edge.direction().opposite(), true, store)
    } else {
      Motion::Landed
    }
  }

  pub fn is_complete(&self, store: &AssignmentStore) -> bool {
    (0..self.total).all(|index| self.is_assigned(store, index))
  }

  fn edge_ahead(&self, direction: Direction) -> Option<Edge> {
    match direction {
      Direction::Forward if self.target + 1 >= self.total => Some(Edge::Last),
      Direction::Backward if self.target == 0 => Some(Edge::First),
      _ => None
    }
  }

  fn is_assigned(&self, store: &AssignmentStore, index: usize) -> bool {
    store.is_assigned(HunkId(index))
  }
}
