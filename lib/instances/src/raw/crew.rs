use crate::DataError;

/// Calendar date as it appears in the flight table (`M/D[/Y]`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawDate {
  pub month: u32,
  pub day: u32,
  pub year: Option<u32>,
}

/// Wall-clock time, `HH:MM`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawClock {
  pub hour: u32,
  pub minute: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrewRecord {
  pub emp_no: String,
  pub captain: bool,
  pub first_officer: bool,
  pub deadhead: bool,
  pub base: String,
  pub duty_cost_per_hour: f64,
  pub pairing_cost_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
  pub flt_num: String,
  pub dptr_date: RawDate,
  pub dptr_time: RawClock,
  pub dptr_stn: String,
  pub arrv_date: RawDate,
  pub arrv_time: RawClock,
  pub arrv_stn: String,
  pub comp: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
  pub crew: Vec<CrewRecord>,
  pub flights: Vec<FlightRecord>,
}

/// Down-sampling of the record tables: keep every `crew_stride`-th crew record and every
/// `flight_stride`-th flight record (counting from 1), so a stride of 1 keeps everything.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Sampling {
  pub crew_stride: usize,
  pub flight_stride: usize,
}

impl Default for Sampling {
  fn default() -> Self { Sampling { crew_stride: 1, flight_stride: 1 } }
}

fn take_every<T>(records: Vec<T>, stride: usize) -> Vec<T> {
  records.into_iter()
    .enumerate()
    .filter_map(|(k, r)| if (k + 1) % stride == 0 { Some(r) } else { None })
    .collect()
}

impl RawTables {
  pub fn sample(self, sampling: &Sampling) -> Result<RawTables, DataError> {
    if sampling.crew_stride == 0 {
      return Err(DataError::InvalidStride { table: "crew" });
    }
    if sampling.flight_stride == 0 {
      return Err(DataError::InvalidStride { table: "flight" });
    }
    Ok(RawTables {
      crew: take_every(self.crew, sampling.crew_stride),
      flights: take_every(self.flights, sampling.flight_stride),
    })
  }
}
