use std::path::Path;
use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::DataError;
use crate::raw::crew::*;
use super::{
  ParseInstance,
  common,
  nom_prelude::*,
};

/// Comma-separated crew and flight tables, each with a single header row.
#[derive(Debug, Copy, Clone)]
pub struct CsvFmt<P, Q> {
  pub crew: P,
  pub flights: Q,
}

impl<P: AsRef<Path>, Q: AsRef<Path>> ParseInstance<CsvFmt<P, Q>> for RawTables {
  fn parse(input: CsvFmt<P, Q>) -> crate::Result<RawTables> {
    let crew_path = input.crew.as_ref();
    let flight_path = input.flights.as_ref();
    let crew = std::fs::read_to_string(crew_path)
      .with_context(|| format!("failed to read {:?}", crew_path))?;
    let flights = std::fs::read_to_string(flight_path)
      .with_context(|| format!("failed to read {:?}", flight_path))?;
    Ok(RawTables {
      crew: parse_crew_table(&crew).with_context(|| format!("in {:?}", crew_path))?,
      flights: parse_flight_table(&flights).with_context(|| format!("in {:?}", flight_path))?,
    })
  }
}

struct Row<'a> {
  table: &'static str,
  line: usize,
  fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
  fn column(&self, k: usize, field: &'static str) -> Result<&'a str, DataError> {
    self.fields.get(k)
      .map(|s| s.trim())
      .ok_or(DataError::MissingField { table: self.table, line: self.line, field })
  }

  fn required(&self, k: usize, field: &'static str) -> Result<&'a str, DataError> {
    match self.column(k, field)? {
      "" => Err(DataError::MissingField { table: self.table, line: self.line, field }),
      s => Ok(s),
    }
  }

  fn parse<O, F>(&self, k: usize, field: &'static str, parser: F) -> Result<O, DataError>
    where
      F: Parser<&'a str, O, error::Error<&'a str>>
  {
    let s = self.required(k, field)?;
    all_consuming(parser)(s).finish()
      .map(|(_, o)| o)
      .map_err(|_| DataError::MalformedField { table: self.table, line: self.line, field, value: s.to_string() })
  }

  fn flag(&self, k: usize, field: &'static str) -> Result<bool, DataError> {
    self.column(k, field).map(common::flag)
  }
}

/// Data records of a table, skipping the header.  Quoting and surrounding whitespace are handled
/// by the reader; short rows are let through so the missing column is reported by name.  Line
/// numbers are 1-based and count the header.
fn records<'a>(table: &'static str, input: &'a str) -> impl Iterator<Item=Result<(usize, StringRecord), DataError>> + 'a {
  ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::All)
    .from_reader(input.as_bytes())
    .into_records()
    .map(move |rec| {
      let rec = rec.map_err(|e| DataError::MalformedRow {
        table,
        line: e.position().map_or(0, |p| p.line() as usize),
        message: e.to_string(),
      })?;
      let line = rec.position().map_or(0, |p| p.line() as usize);
      Ok((line, rec))
    })
}

pub(crate) fn parse_crew_table(input: &str) -> Result<Vec<CrewRecord>, DataError> {
  records("crew", input)
    .map(|rec| {
      let (line, record) = rec?;
      let row = Row { table: "crew", line, fields: record.iter().collect() };
      Ok(CrewRecord {
        emp_no: row.required(0, "EmpNo")?.to_string(),
        captain: row.flag(1, "Captain")?,
        first_officer: row.flag(2, "FirstOfficer")?,
        deadhead: row.flag(3, "Deadhead")?,
        base: row.required(4, "Base")?.to_string(),
        duty_cost_per_hour: row.parse(5, "DutyCostPerHour", common::cost)?,
        pairing_cost_per_hour: row.parse(6, "PairingCostPerHour", common::cost)?,
      })
    })
    .collect()
}

pub(crate) fn parse_flight_table(input: &str) -> Result<Vec<FlightRecord>, DataError> {
  records("flight", input)
    .map(|rec| {
      let (line, record) = rec?;
      let row = Row { table: "flight", line, fields: record.iter().collect() };
      Ok(FlightRecord {
        flt_num: row.required(0, "FltNum")?.to_string(),
        dptr_date: row.parse(1, "DptrDate", common::date)?,
        dptr_time: row.parse(2, "DptrTime", common::clock)?,
        dptr_stn: row.required(3, "DptrStn")?.to_string(),
        arrv_date: row.parse(4, "ArrvDate", common::date)?,
        arrv_time: row.parse(5, "ArrvTime", common::clock)?,
        arrv_stn: row.required(6, "ArrvStn")?.to_string(),
        comp: row.parse(7, "Comp", recognize(common::composition))?.to_string(),
      })
    })
    .collect()
}


#[cfg(test)]
mod tests {
  use super::*;

  const CREW: &str = "EmpNo,Captain,FirstOfficer,Deadhead,Base,DutyCostPerHour,ParingCostPerHour\r\n\
                      A0001,Y,N,Y,NKX,682,1164\r\n\
                      A0002,N,Y,,NKX,570.5,1140\r\n\
                      \r\n";

  const FLIGHTS: &str = "FltNum,DptrDate,DptrTime,DptrStn,ArrvDate,ArrvTime,ArrvStn,Comp\n\
                         FA680,08/11/2021,07:20,NKX,08/11/2021,09:00,TGD,C1F1\n";

  #[test]
  fn crew_table() {
    let crew = parse_crew_table(CREW).unwrap();
    assert_eq!(crew.len(), 2);
    assert_eq!(crew[0].emp_no, "A0001");
    assert!(crew[0].captain && !crew[0].first_officer && crew[0].deadhead);
    assert!(!crew[1].captain && crew[1].first_officer && !crew[1].deadhead);
    assert_eq!(crew[1].duty_cost_per_hour, 570.5);
    assert_eq!(crew[1].base, "NKX");
  }

  #[test]
  fn flight_table() {
    let flights = parse_flight_table(FLIGHTS).unwrap();
    assert_eq!(flights.len(), 1);
    let f = &flights[0];
    assert_eq!(f.flt_num, "FA680");
    assert_eq!(f.dptr_date.day, 11);
    assert_eq!(f.dptr_time, RawClock { hour: 7, minute: 20 });
    assert_eq!(f.arrv_stn, "TGD");
    assert_eq!(f.comp, "C1F1");
  }

  #[test]
  fn quoted_fields() {
    let input = "EmpNo,Captain,FirstOfficer,Deadhead,Base,DutyCostPerHour,ParingCostPerHour\n\
                 \"A0001\",\"Y\",\"N\",\"Y\",\"NKX\",682,1164\n\
                 \"A0002\",\"N\",\"Y\",\"N\",\"TGD\",\"570.5\",1140\n";
    let crew = parse_crew_table(input).unwrap();
    assert_eq!(crew.len(), 2);
    assert_eq!(crew[0].emp_no, "A0001");
    assert_eq!(crew[0].base, "NKX");
    assert!(crew[0].captain && !crew[0].first_officer && crew[0].deadhead);
    assert!(!crew[1].captain && crew[1].first_officer && !crew[1].deadhead);
    assert_eq!(crew[1].base, "TGD");
    assert_eq!(crew[1].duty_cost_per_hour, 570.5);

    let flights = "FltNum,DptrDate,DptrTime,DptrStn,ArrvDate,ArrvTime,ArrvStn,Comp\n\
                   \"FA680\",\"08/11/2021\",\"07:20\",\"NKX\",\"08/11/2021\",\"09:00\",\"TGD\",\"C1F1\"\n";
    let f = &parse_flight_table(flights).unwrap()[0];
    assert_eq!(f.flt_num, "FA680");
    assert_eq!(f.dptr_stn, "NKX");
    assert_eq!(f.comp, "C1F1");
  }

  #[test]
  fn line_numbers_count_header() {
    let input = "header\nFA1,08/11/2021,07:20,NKX,08/11/2021,09:00,TGD,C1F1\nFA2,08/11/2021,7h20,NKX,08/11/2021,09:00,TGD,C1F1\n";
    assert!(matches!(parse_flight_table(input), Err(DataError::MalformedField { line: 3, field: "DptrTime", .. })));
  }

  #[test]
  fn malformed_time() {
    let input = "header\nFA1,08/11/2021,7h20,NKX,08/11/2021,09:00,TGD,C1F1\n";
    assert_eq!(
      parse_flight_table(input),
      Err(DataError::MalformedField { table: "flight", line: 2, field: "DptrTime", value: "7h20".to_string() })
    );
  }

  #[test]
  fn missing_column() {
    let input = "header\nA0001,Y,N,Y,NKX,682\n";
    assert_eq!(
      parse_crew_table(input),
      Err(DataError::MissingField { table: "crew", line: 2, field: "PairingCostPerHour" })
    );
  }

  #[test]
  fn malformed_composition() {
    let input = "header\nFA1,08/11/2021,07:20,NKX,08/11/2021,09:00,TGD,CF\n";
    assert!(matches!(parse_flight_table(input), Err(DataError::MalformedField { field: "Comp", .. })));
  }

  #[test]
  fn empty_required_field() {
    let input = "header\nFA1,08/11/2021,07:20,,08/11/2021,09:00,TGD,C1F1\n";
    assert_eq!(
      parse_flight_table(input),
      Err(DataError::MissingField { table: "flight", line: 2, field: "DptrStn" })
    );
  }
}
