use tracing::*;

use crate::Set;
use crate::data::*;

/// Append one anchor flight for every crew base that does not have one yet, returning the number
/// of anchors added.  Calling this again on the same crew list adds nothing.
#[instrument(level = "debug", skip(data), fields(data_id = %data.id))]
pub fn add_anchors(data: &mut CrewInstance) -> Result<usize, DataError> {
  let bases: Vec<String> = data.bases().into_iter().map(String::from).collect();
  let existing: Set<String> = data.anchors().map(|(_, f)| f.id.clone()).collect();

  let mut added = 0;
  for base in bases {
    if existing.contains(&base) { continue; }
    if data.flights.iter().any(|f| f.id == base) {
      return Err(DataError::AnchorCollision { base });
    }
    trace!(%base, "anchor");
    data.flights.push(Flight::anchor(&base));
    added += 1;
  }
  debug!(added, "base anchors");
  Ok(added)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::fixtures::*;

  #[test]
  fn one_anchor_per_base() {
    let mut data = instance(
      vec![
        crew("A1", true, false, false, "NKX"),
        crew("A2", false, true, false, "NKX"),
        crew("A3", true, true, false, "HOM"),
      ],
      vec![flight("FA1", 1, "NKX", 400, "TGD", 500)],
    );
    assert_eq!(add_anchors(&mut data).unwrap(), 2);
    let anchors: Vec<_> = data.anchors().map(|(k, f)| (k, f.id.as_str())).collect();
    assert_eq!(anchors, vec![(1, "HOM"), (2, "NKX")]);
  }

  #[test]
  fn base_without_flights() {
    let mut data = instance(vec![crew("A1", true, false, false, "NKX")], vec![]);
    add_anchors(&mut data).unwrap();
    assert_eq!(data.flights.len(), 1);
    let a = &data.flights[0];
    assert!(a.is_anchor());
    assert_eq!(a.id, "NKX");
    assert_eq!(a.dptr_time, ANCHOR_DEPARTURE);
    assert_eq!(a.arrv_time, 0);
  }

  #[test]
  fn idempotent() {
    let mut data = sample();
    let n = data.flights.len();
    assert_eq!(add_anchors(&mut data).unwrap(), 2);
    assert_eq!(add_anchors(&mut data).unwrap(), 0);
    assert_eq!(data.flights.len(), n + 2);
  }

  #[test]
  fn collision_with_flight_id() {
    let mut data = instance(
      vec![crew("A1", true, false, false, "FA1-1")],
      vec![flight("FA1", 1, "NKX", 400, "TGD", 500)],
    );
    assert_eq!(add_anchors(&mut data), Err(DataError::AnchorCollision { base: "FA1-1".to_string() }));
  }
}
