use std::collections::HashMap;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::*;

use crate::*;
use crate::data::*;

pub mod anchors;
pub mod reduce;

pub use anchors::add_anchors;
pub use reduce::{reduce, ArcBudget, ReduceStats};

/// A shareability arc `(i, j)`: one crew member may fly `j` immediately after `i`.
pub type Arc = (FlightIdx, FlightIdx);

/// Edge predicate, apart from `i != j`.  Anchors depart at `Time::MAX` and arrive at 0, so they
/// only ever start or end a path.
#[inline]
pub fn is_shareable(i: &Flight, j: &Flight) -> bool {
  i.arrv_stn == j.dptr_stn && i.arrv_time < j.dptr_time
}

#[inline]
pub fn touches_anchor(flights: &[Flight], &(i, j): &Arc) -> bool {
  flights[i as usize].is_anchor() || flights[j as usize].is_anchor()
}

/// The complete candidate graph: every ordered pair is inspected, the outer loop split across the
/// rayon pool.
#[instrument(level = "info", skip(flights), fields(flights = flights.len()))]
pub fn build_arcs(flights: &[Flight]) -> Set<Arc> {
  let arcs: Vec<Arc> = (0..flights.len()).into_par_iter()
    .map(|i| {
      let fi = &flights[i];
      flights.iter()
        .enumerate()
        .filter(move |&(j, fj)| i != j && is_shareable(fi, fj))
        .map(move |(j, _)| (i as FlightIdx, j as FlightIdx))
        .collect_vec()
    })
    .flatten_iter()
    .collect();

  let arcs: Set<Arc> = arcs.into_iter().collect();
  debug!(count = arcs.len(), "candidate arcs");
  arcs
}

pub struct Network<'a> {
  pub data: &'a CrewInstance,
  pub arcs: Set<Arc>,
  pub size_info: HashMap<String, isize>,
}

impl<'a> Network<'a> {
  pub fn num_anchor_arcs(&self) -> usize {
    self.arcs.iter().filter(|a| touches_anchor(&self.data.flights, a)).count()
  }

  pub fn sorted_arcs(&self) -> Vec<Arc> {
    self.arcs.iter().copied().sorted().collect()
  }
}

/// Build the shareability network over `data.flights` (anchors included) and, given a budget,
/// prune it down to size.
#[instrument(level = "info", name = "build_shareability_network", skip(data, budget), fields(data_id = %data.id))]
pub fn build_network<'a>(data: &'a CrewInstance, budget: Option<&ArcBudget>) -> Result<Network<'a>, Error> {
  let mut arcs = build_arcs(&data.flights);
  let mut size_info = HashMap::default();
  size_info.insert("flights".to_string(), data.flights.len() as isize);
  size_info.insert("anchors".to_string(), data.anchors().count() as isize);
  size_info.insert("crew".to_string(), data.crew.len() as isize);
  size_info.insert("arcs".to_string(), arcs.len() as isize);

  if let Some(budget) = budget {
    let stats = reduce(&mut arcs, &data.flights, budget)?;
    size_info.insert("anchor_arcs".to_string(), stats.anchor_arcs as isize);
    size_info.insert("day_gap_deleted".to_string(), stats.day_gap_deleted as isize);
    size_info.insert("random_deleted".to_string(), stats.random_deleted as isize);
    size_info.insert("reduced_arcs".to_string(), arcs.len() as isize);
  }

  info!(count = arcs.len(), "arc num: {}", arcs.len());
  Ok(Network { data, arcs, size_info })
}
