use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::Result;
use structopt::StructOpt;

use crewnet::data::Sampling;
use crewnet::engine::EngineParams;
use crewnet::network::ArcBudget;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  #[structopt(long="format", short="f", parse(try_from_str), default_value="json-summ", possible_values=&OUTPUT_FORMAT_STRINGS)]
  pub fmt: OutputFormat,
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Write the assembled model in LP format to this file.
  #[structopt(long)]
  pub lp: Option<PathBuf>,
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

#[derive(Clone, Debug, StructOpt)]
pub struct SamplingOptions {
  /// Keep every n-th crew record.
  #[structopt(long, default_value="1", validator=clap_range_validator(Some(1), None))]
  pub crew_stride: usize,
  /// Keep every n-th flight record.
  #[structopt(long, default_value="1", validator=clap_range_validator(Some(1), None))]
  pub flight_stride: usize,
}

impl From<&SamplingOptions> for Sampling {
  fn from(o: &SamplingOptions) -> Sampling {
    Sampling { crew_stride: o.crew_stride, flight_stride: o.flight_stride }
  }
}

#[derive(Clone, Debug, StructOpt)]
pub struct BudgetOptions {
  /// Upper bound on the number of arcs kept in the network.
  #[structopt(long, default_value="7000")]
  pub max_arcs: usize,
  /// Reduction iteration cap (default: proportional to the number of arcs).
  #[structopt(long)]
  pub max_iterations: Option<usize>,
  #[structopt(long, default_value="0")]
  pub seed: u64,
  /// Skip arc reduction entirely.
  #[structopt(long="no-reduce", parse(from_flag=std::ops::Not::not))]
  pub reduce: bool,
}

impl From<&BudgetOptions> for ArcBudget {
  fn from(o: &BudgetOptions) -> ArcBudget {
    ArcBudget { max_arcs: o.max_arcs, max_iterations: o.max_iterations, seed: o.seed }
  }
}

#[derive(Clone, Debug, StructOpt)]
pub struct EngineOptions {
  #[structopt(long, default_value="0")]
  pub cut_level: u8,
  #[structopt(long, default_value="3")]
  pub heur_level: u8,
}

impl From<&EngineOptions> for EngineParams {
  fn from(o: &EngineOptions) -> EngineParams {
    EngineParams { cut_level: o.cut_level, heur_level: o.heur_level }
  }
}

pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        if let Some(y) = minval {
            if x < y { return Err(format!("must be at least {}", y)); }
        }
        if let Some(y) = maxval {
            if x > y { return Err(format!("must be at most {}", y)); }
        }
        return Ok(());
    };
}

pub const OUTPUT_FORMAT_STRINGS: [&str; 2] = ["json", "json-summ"];

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    Json,
    JsonSummary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Json),
            "json-summ" => Ok(Self::JsonSummary),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}

impl Default for OutputFormat {
  fn default() -> Self { OutputFormat::JsonSummary }
}


pub trait NetworkOutput {
    /// Sizes plus the full arc list and role matrix.
    fn write_json(&self, buf : impl io::Write) -> Result<()>;
    fn write_json_summary(&self, buf : impl io::Write) -> Result<()>;

    fn write(&self, buf : impl io::Write, output : OutputFormat) -> Result<()> {
        match output {
            OutputFormat::JsonSummary => self.write_json_summary(buf)?,
            OutputFormat::Json => self.write_json(buf)?,
        };
        Ok(())
    }
}

pub fn output_network(options: &OutputOptions, network: &impl NetworkOutput) -> Result<()> {
  match options.file.as_ref() {
      Some(path) => {
        let writer = io::BufWriter::new(std::fs::File::create(path)?);
        network.write(writer, options.fmt)?;
      }
      None => {
        network.write(io::stdout(), options.fmt)?;
      }
    }
  Ok(())
}
