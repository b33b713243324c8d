//! Arc-budget reduction of the shareability network.
//!
//! Arcs between flights more than one day apart are removed first, all at once.  Once none are
//! left, arcs are drawn uniformly at random from the remaining set and removed unless they touch
//! an anchor.  Anchor arcs are never removed, so a budget below their count is rejected up front,
//! and the random phase is bounded by an explicit iteration cap.

use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::*;

use crate::*;
use crate::data::*;
use super::{Arc, touches_anchor};

/// Iterations allowed per initial arc when no explicit cap is given.
pub const DEFAULT_ITERATIONS_PER_ARC: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcBudget {
  pub max_arcs: usize,
  /// Upper bound on reduction iterations (one day-gap pass or one random draw each).
  pub max_iterations: Option<usize>,
  pub seed: u64,
}

impl Default for ArcBudget {
  fn default() -> Self {
    ArcBudget { max_arcs: 7000, max_iterations: None, seed: 0 }
  }
}

impl ArcBudget {
  pub fn new(max_arcs: usize) -> Self {
    ArcBudget { max_arcs, ..Default::default() }
  }

  fn iteration_cap(&self, num_arcs: usize) -> usize {
    self.max_iterations
      .unwrap_or_else(|| DEFAULT_ITERATIONS_PER_ARC.saturating_mul(num_arcs).saturating_add(1))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceStats {
  pub initial_arcs: usize,
  pub anchor_arcs: usize,
  pub day_gap_deleted: usize,
  pub random_deleted: usize,
  /// Random draws that landed on an anchor arc.
  pub random_misses: usize,
  pub iterations: usize,
}

/// Days between the departures of two physical flights; `None` if either is an anchor.
#[inline]
fn day_gap(fi: &Flight, fj: &Flight) -> Option<Day> {
  match (fi.day(), fj.day()) {
    (Some(a), Some(b)) => Some(if a > b { a - b } else { b - a }),
    _ => None,
  }
}

/// Arcs that may be removed without touching an anchor and that join flights more than one day
/// apart.  Works on a snapshot, so removals never affect what a pass considers.
fn day_gap_arcs(arcs: &Set<Arc>, flights: &[Flight]) -> Vec<Arc> {
  arcs.iter()
    .copied()
    .filter(|&(i, j)| matches!(day_gap(&flights[i as usize], &flights[j as usize]), Some(d) if d > 1))
    .collect()
}

/// Remove arcs until at most `budget.max_arcs` remain.
#[instrument(level = "info", skip(arcs, flights), fields(arcs = arcs.len()))]
pub fn reduce(arcs: &mut Set<Arc>, flights: &[Flight], budget: &ArcBudget) -> Result<ReduceStats, Error> {
  let anchor_arcs = arcs.iter().filter(|a| touches_anchor(flights, a)).count();
  let mut stats = ReduceStats { initial_arcs: arcs.len(), anchor_arcs, ..Default::default() };

  if arcs.len() <= budget.max_arcs {
    return Ok(stats);
  }
  if budget.max_arcs < anchor_arcs {
    error!(max_arcs = budget.max_arcs, anchor_arcs, "arc budget below anchor arc count");
    return Err(Error::ArcBudgetTooSmall { max_arcs: budget.max_arcs, anchor_arcs });
  }

  let max_iterations = budget.iteration_cap(arcs.len());
  let mut rng = StdRng::seed_from_u64(budget.seed);
  // Current arcs in draw order; only built once the day-gap passes run dry.
  let mut pool: Option<Vec<Arc>> = None;

  while arcs.len() > budget.max_arcs {
    if stats.iterations >= max_iterations {
      error!(max_iterations, remaining = arcs.len(), "arc reduction did not converge");
      return Err(Error::IterationLimit { max_iterations, arcs: arcs.len(), max_arcs: budget.max_arcs });
    }
    stats.iterations += 1;

    if pool.is_none() {
      let marked = day_gap_arcs(arcs, flights);
      if !marked.is_empty() {
        for a in &marked {
          arcs.remove(a);
        }
        stats.day_gap_deleted += marked.len();
        debug!(removed = marked.len(), remaining = arcs.len(), "day-gap pass");
        continue;
      }
      // Arcs are never added, so no later pass can find a day-gap arc either.
      pool = Some(arcs.iter().copied().sorted().collect());
    }

    if let Some(pool) = pool.as_mut() {
      let k = rng.gen_range(0, pool.len());
      let arc = pool[k];
      if touches_anchor(flights, &arc) {
        stats.random_misses += 1;
      } else {
        pool.swap_remove(k);
        arcs.remove(&arc);
        stats.random_deleted += 1;
        trace!(?arc, "random removal");
      }
    }
  }

  debug!(?stats, "arc reduction finished");
  Ok(stats)
}
