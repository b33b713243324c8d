use super::nom_prelude::*;
use crate::raw::crew::{RawClock, RawDate};

pub fn u32_<'a, E>(input: &'a str) -> IResult<&'a str, u32, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map_res(digit1, u32::from_str)(input)
}

pub fn u8_<'a, E>(input: &'a str) -> IResult<&'a str, u8, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map_res(digit1, u8::from_str)(input)
}

/// `HH:MM`, 24-hour clock.
pub fn clock<'a, E>(input: &'a str) -> IResult<&'a str, RawClock, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map(
    verify(
      separated_pair(u32_, char(':'), u32_),
      |&(h, m): &(u32, u32)| h < 24 && m < 60,
    ),
    |(hour, minute)| RawClock { hour, minute },
  )(input)
}

/// `M/D` with an optional `/Y`.  The second component is the day of month.
pub fn date<'a, E>(input: &'a str) -> IResult<&'a str, RawDate, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map(
    verify(
      tuple((u32_, preceded(char('/'), u32_), opt(preceded(char('/'), u32_)))),
      |&(_, d, _): &(u32, u32, Option<u32>)| 1 <= d && d <= 31,
    ),
    |(month, day, year)| RawDate { month, day, year },
  )(input)
}

/// Composition codes such as `C1F1`: minimum number of captains, then first officers.
pub fn composition<'a, E>(input: &'a str) -> IResult<&'a str, (u8, u8), E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  pair(preceded(char('C'), u8_), preceded(char('F'), u8_))(input)
}

pub fn cost<'a, E>(input: &'a str) -> IResult<&'a str, f64, E>
  where
    E: ParseError<&'a str>
{
  double(input)
}

pub fn flag(field: &str) -> bool {
  field.trim() == "Y"
}
