//! Typed crew and flight entities, with the derived fields (absolute times, duration, day of
//! schedule) computed once at load time.

use std::borrow::Cow;
use std::collections::BTreeSet;
use nom::{combinator::all_consuming, Finish};

use crate::{DataError, Map};
use crate::parsers::common;
use crate::raw::{FromRaw, crew::*};

/// Minutes since the schedule epoch.
pub type Time = u32;
/// Day of schedule, as given by the day-of-month of the departure date.
pub type Day = u32;
pub type FlightIdx = u32;
pub type CrewIdx = u32;
pub type Cost = f64;

pub const MINUTES_PER_DAY: Time = 1440;
/// Departure time of every anchor flight: no flight ever connects *into* an anchor's departure.
pub const ANCHOR_DEPARTURE: Time = Time::MAX;
pub const ANCHOR_ARRIVAL: Time = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct Crew {
  pub id: String,
  pub is_captain: bool,
  pub is_first_officer: bool,
  pub is_deadhead: bool,
  pub base: String,
  pub duty_cost_per_hour: Cost,
  pub pairing_cost_per_hour: Cost,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Composition {
  pub code: String,
  pub captains: u8,
  pub first_officers: u8,
}

impl Composition {
  pub fn parse(code: &str) -> Option<Composition> {
    let (_, (captains, first_officers)) = all_consuming(common::composition::<nom::error::Error<&str>>)(code)
      .finish()
      .ok()?;
    Some(Composition { code: code.to_string(), captains, first_officers })
  }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlightKind {
  Physical { day: Day },
  /// Synthetic source/sink for a crew base.
  Anchor,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flight {
  pub id: String,
  pub kind: FlightKind,
  pub dptr_stn: String,
  pub arrv_stn: String,
  pub dptr_time: Time,
  pub arrv_time: Time,
  pub flt_time: Time,
  pub comp: Option<Composition>,
}

#[inline]
pub fn timestamp(day: Day, hour: u32, minute: u32) -> Time {
  day * MINUTES_PER_DAY + hour * 60 + minute
}

impl Flight {
  /// A physical flight departing on `day`.  Times are absolute; the id is `{flt_num}-{day}`.
  pub fn physical(flt_num: &str, day: Day, dptr_stn: &str, dptr_time: Time, arrv_stn: &str, arrv_time: Time) -> Flight {
    Flight {
      id: format!("{}-{}", flt_num, day),
      kind: FlightKind::Physical { day },
      dptr_stn: dptr_stn.to_string(),
      arrv_stn: arrv_stn.to_string(),
      dptr_time,
      arrv_time,
      flt_time: arrv_time.saturating_sub(dptr_time),
      comp: None,
    }
  }

  pub fn anchor(base: &str) -> Flight {
    Flight {
      id: base.to_string(),
      kind: FlightKind::Anchor,
      dptr_stn: base.to_string(),
      arrv_stn: base.to_string(),
      dptr_time: ANCHOR_DEPARTURE,
      arrv_time: ANCHOR_ARRIVAL,
      flt_time: 0,
      comp: None,
    }
  }

  #[inline]
  pub fn is_anchor(&self) -> bool {
    self.kind == FlightKind::Anchor
  }

  #[inline]
  pub fn day(&self) -> Option<Day> {
    match self.kind {
      FlightKind::Physical { day } => Some(day),
      FlightKind::Anchor => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrewInstance {
  pub id: String,
  pub crew: Vec<Crew>,
  /// Physical flights in record order, followed by any anchors.
  pub flights: Vec<Flight>,
}

impl CrewInstance {
  /// Distinct crew bases, sorted.
  pub fn bases(&self) -> BTreeSet<&str> {
    self.crew.iter().map(|c| c.base.as_str()).collect()
  }

  pub fn flight_index(&self) -> Map<&str, FlightIdx> {
    self.flights.iter()
      .enumerate()
      .map(|(k, f)| (f.id.as_str(), k as FlightIdx))
      .collect()
  }

  pub fn anchors(&self) -> impl Iterator<Item=(FlightIdx, &Flight)> {
    self.flights.iter()
      .enumerate()
      .filter(|(_, f)| f.is_anchor())
      .map(|(k, f)| (k as FlightIdx, f))
  }

  pub fn num_physical_flights(&self) -> usize {
    self.flights.iter().filter(|f| !f.is_anchor()).count()
  }
}

fn crew_from_record(r: CrewRecord) -> Crew {
  Crew {
    id: r.emp_no,
    is_captain: r.captain,
    is_first_officer: r.first_officer,
    is_deadhead: r.deadhead,
    base: r.base,
    duty_cost_per_hour: r.duty_cost_per_hour,
    pairing_cost_per_hour: r.pairing_cost_per_hour,
  }
}

fn flight_from_record(r: FlightRecord, line: usize) -> Result<Flight, DataError> {
  let day = r.dptr_date.day;
  let dptr_time = timestamp(day, r.dptr_time.hour, r.dptr_time.minute);
  let arrv_time = timestamp(r.arrv_date.day, r.arrv_time.hour, r.arrv_time.minute);
  let comp = Composition::parse(&r.comp)
    .ok_or_else(|| DataError::MalformedField { table: "flight", line, field: "Comp", value: r.comp.clone() })?;
  let mut flight = Flight::physical(&r.flt_num, day, &r.dptr_stn, dptr_time, &r.arrv_stn, arrv_time);
  if arrv_time < dptr_time {
    return Err(DataError::ArrivalBeforeDeparture { flight: flight.id });
  }
  flight.comp = Some(comp);
  Ok(flight)
}

impl FromRaw<RawTables> for CrewInstance {
  /// Expects the tables to be sampled already (see [`RawTables::sample`]).
  fn from_raw(raw: RawTables, id: Cow<str>) -> crate::Result<CrewInstance> {
    let crew: Vec<Crew> = raw.crew.into_iter().map(crew_from_record).collect();
    let flights = raw.flights.into_iter()
      .enumerate()
      .map(|(k, r)| flight_from_record(r, k + 1))
      .collect::<Result<Vec<_>, _>>()?;

    let mut seen = Map::default();
    for c in &crew {
      if seen.insert(c.id.as_str(), ()).is_some() {
        return Err(DataError::DuplicateId { table: "crew", id: c.id.clone() }.into());
      }
    }
    seen.clear();
    for f in &flights {
      if seen.insert(f.id.as_str(), ()).is_some() {
        return Err(DataError::DuplicateId { table: "flight", id: f.id.clone() }.into());
      }
    }

    Ok(CrewInstance { id: id.into_owned(), crew, flights })
  }
}

/// Sample the record tables and build the entity catalog.
pub fn load_from_tables(raw: RawTables, id: Cow<str>, sampling: &Sampling) -> crate::Result<CrewInstance> {
  CrewInstance::from_raw(raw.sample(sampling)?, id)
}


#[cfg(test)]
mod tests {
  use super::*;

  fn crew_record(id: &str, flags: (bool, bool, bool), base: &str) -> CrewRecord {
    CrewRecord {
      emp_no: id.to_string(),
      captain: flags.0,
      first_officer: flags.1,
      deadhead: flags.2,
      base: base.to_string(),
      duty_cost_per_hour: 1.0,
      pairing_cost_per_hour: 2.0,
    }
  }

  fn flight_record(num: &str, day: u32, dep: (u32, u32), from: &str, arr: (u32, u32), to: &str) -> FlightRecord {
    FlightRecord {
      flt_num: num.to_string(),
      dptr_date: RawDate { month: 8, day, year: Some(2021) },
      dptr_time: RawClock { hour: dep.0, minute: dep.1 },
      dptr_stn: from.to_string(),
      arrv_date: RawDate { month: 8, day, year: Some(2021) },
      arrv_time: RawClock { hour: arr.0, minute: arr.1 },
      arrv_stn: to.to_string(),
      comp: "C1F1".to_string(),
    }
  }

  #[test]
  fn derived_fields() {
    let raw = RawTables {
      crew: vec![crew_record("A1", (true, false, true), "NKX")],
      flights: vec![flight_record("FA680", 11, (7, 20), "NKX", (9, 0), "TGD")],
    };
    let data = CrewInstance::from_raw(raw, "t".into()).unwrap();
    let f = &data.flights[0];
    assert_eq!(f.id, "FA680-11");
    assert_eq!(f.day(), Some(11));
    assert_eq!(f.dptr_time, 11 * 1440 + 7 * 60 + 20);
    assert_eq!(f.arrv_time, 11 * 1440 + 9 * 60);
    assert_eq!(f.flt_time, 100);
    assert_eq!(f.comp, Some(Composition { code: "C1F1".to_string(), captains: 1, first_officers: 1 }));
    assert!(data.crew[0].is_captain && data.crew[0].is_deadhead);
  }

  #[test]
  fn same_number_different_days() {
    let raw = RawTables {
      crew: vec![],
      flights: vec![
        flight_record("FA680", 11, (7, 20), "NKX", (9, 0), "TGD"),
        flight_record("FA680", 12, (7, 20), "NKX", (9, 0), "TGD"),
      ],
    };
    let data = CrewInstance::from_raw(raw, "t".into()).unwrap();
    assert_eq!(data.flights[0].id, "FA680-11");
    assert_eq!(data.flights[1].id, "FA680-12");
  }

  #[test]
  fn duplicate_flight_rejected() {
    let raw = RawTables {
      crew: vec![],
      flights: vec![
        flight_record("FA680", 11, (7, 20), "NKX", (9, 0), "TGD"),
        flight_record("FA680", 11, (8, 20), "NKX", (10, 0), "TGD"),
      ],
    };
    let err = CrewInstance::from_raw(raw, "t".into()).unwrap_err();
    assert_eq!(
      err.downcast_ref::<DataError>(),
      Some(&DataError::DuplicateId { table: "flight", id: "FA680-11".to_string() })
    );
  }

  #[test]
  fn arrival_before_departure_rejected() {
    let raw = RawTables {
      crew: vec![],
      flights: vec![flight_record("FA1", 11, (9, 0), "NKX", (7, 0), "TGD")],
    };
    let err = CrewInstance::from_raw(raw, "t".into()).unwrap_err();
    assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::ArrivalBeforeDeparture { .. })));
  }

  #[test]
  fn bad_composition_rejected() {
    let mut r = flight_record("FA1", 11, (7, 0), "NKX", (9, 0), "TGD");
    r.comp = "two pilots".to_string();
    let raw = RawTables { crew: vec![], flights: vec![r] };
    let err = CrewInstance::from_raw(raw, "t".into()).unwrap_err();
    assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::MalformedField { field: "Comp", .. })));
  }

  #[test]
  fn sampled_load() {
    let raw = RawTables {
      crew: (0..6).map(|k| crew_record(&format!("A{}", k), (true, true, true), "NKX")).collect(),
      flights: (1..=4).map(|d| flight_record("FA1", d, (7, 0), "NKX", (9, 0), "TGD")).collect(),
    };
    let s = Sampling { crew_stride: 3, flight_stride: 2 };
    let data = load_from_tables(raw, "t".into(), &s).unwrap();
    assert_eq!(data.crew.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["A2", "A5"]);
    assert_eq!(data.flights.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), vec!["FA1-2", "FA1-4"]);
  }

  #[test]
  fn anchor_fields() {
    let a = Flight::anchor("NKX");
    assert!(a.is_anchor());
    assert_eq!(a.dptr_time, ANCHOR_DEPARTURE);
    assert_eq!(a.arrv_time, 0);
    assert_eq!(a.flt_time, 0);
    assert_eq!(a.day(), None);
  }
}
