use std::path::Path;
use anyhow::Result;
use instances::dataset::{Dataset, DynLayout, IdxNameMap};
use tracing::*;

pub use instances::DataError;
pub use instances::raw::crew::Sampling;
pub use instances::dataset::crew::{
  Composition,
  Crew,
  CrewIdx,
  CrewInstance,
  Day,
  Flight,
  FlightIdx,
  FlightKind,
  Time,
  ANCHOR_ARRIVAL,
  ANCHOR_DEPARTURE,
};

fn log_sizes(data: &CrewInstance) {
  info!(flights = data.flights.len(), crew = data.crew.len(), "selected flights: {}, selected crew: {}", data.flights.len(), data.crew.len());
}

#[instrument(level = "debug")]
pub fn load_instance(crew: &Path, flights: &Path, sampling: &Sampling) -> Result<CrewInstance> {
  let id = crew.file_name()
    .and_then(|s| s.to_str())
    .map(|s| s.strip_suffix(instances::dataset::CREW_SUFFIX).unwrap_or(s).to_string())
    .unwrap_or_default();
  let data = instances::dataset::load_csv(crew, flights, id.into(), sampling)?;
  log_sizes(&data);
  Ok(data)
}

pub fn get_instance_by_name(dir: impl AsRef<Path>, name: &str, sampling: &Sampling) -> Result<CrewInstance> {
  let layout = DynLayout::new(dir)?.with_sampling(*sampling);
  let data = layout.load_instance(layout.name_to_index(name)?)?;
  log_sizes(&data);
  Ok(data)
}

#[cfg(test)]
pub(crate) mod fixtures {
  use super::*;

  pub const SAMPLE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/sample");

  pub fn sample() -> CrewInstance {
    get_instance_by_name(SAMPLE_DIR, "sample", &Sampling::default()).unwrap()
  }

  pub fn crew(id: &str, captain: bool, first_officer: bool, deadhead: bool, base: &str) -> Crew {
    Crew {
      id: id.to_string(),
      is_captain: captain,
      is_first_officer: first_officer,
      is_deadhead: deadhead,
      base: base.to_string(),
      duty_cost_per_hour: 0.0,
      pairing_cost_per_hour: 0.0,
    }
  }

  /// Same-day flight with times given in minutes after midnight.
  pub fn flight(num: &str, day: Day, from: &str, dep: Time, to: &str, arr: Time) -> Flight {
    Flight::physical(num, day, from, day * 1440 + dep, to, day * 1440 + arr)
  }

  pub fn instance(crew: Vec<Crew>, flights: Vec<Flight>) -> CrewInstance {
    CrewInstance { id: "test".to_string(), crew, flights }
  }
}
