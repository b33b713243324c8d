use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::Error;
use crate::parsers::{CsvFmt, ParseInstance};
use crate::raw::crew::{RawTables, Sampling};

pub mod crew;

pub use crew::{CrewInstance, load_from_tables};

pub const CREW_SUFFIX: &str = "-Crew.csv";
pub const FLIGHT_SUFFIX: &str = "-Flight.csv";

pub trait IdxNameMap {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>>;

  fn name_to_index(&self, name: &str) -> Result<usize>;

  fn len(&self) -> usize;

  fn check_idx(&self, idx: usize) -> Result<()> {
    if self.len() <= idx {
      Err(Error::IndexOutOfRange.into())
    } else {
      Ok(())
    }
  }
}

pub trait Dataset: IdxNameMap + Sync {
  type Instance;
  fn load_instance(&self, idx: usize) -> Result<Self::Instance>;
}

impl<'a, D: Dataset> Dataset for &'a D {
  type Instance = D::Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    D::load_instance(self, idx)
  }
}

impl<'a, D: IdxNameMap> IdxNameMap for &'a D {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    D::index_to_name(self, idx)
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    D::name_to_index(self, name)
  }

  fn len(&self) -> usize {
    D::len(self)
  }
}

/// Resolve `dir` against the `DATA_ROOT` environment variable when it is relative and the variable
/// is set.
pub fn data_dir(dir: impl AsRef<Path>) -> PathBuf {
  let dir = dir.as_ref();
  match std::env::var_os("DATA_ROOT") {
    Some(root) if dir.is_relative() => Path::new(&root).join(dir),
    _ => dir.to_path_buf(),
  }
}

/// A directory of crew-scheduling instances.  Instance `NAME` is the pair of files
/// `NAME-Crew.csv` and `NAME-Flight.csv`; instances are indexed in name order.
pub struct DynLayout {
  dir: PathBuf,
  name_order: Vec<String>,
  name_to_idx_map: HashMap<String, usize>,
  sampling: Sampling,
}

impl DynLayout {
  pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = data_dir(dir);
    let dir = dir.canonicalize().with_context(|| format!("try read directory {:?}", &dir))?;

    let mut patt = dir.to_string_lossy().into_owned();
    patt.push_str("/*");
    patt.push_str(CREW_SUFFIX);

    let paths: std::result::Result<Vec<PathBuf>, _> = glob::glob(&patt)?.collect();
    let mut name_order = paths?.into_iter()
      .filter_map(|p| {
        let name = p.file_name()?.to_str()?.strip_suffix(CREW_SUFFIX)?.to_string();
        if dir.join(format!("{}{}", name, FLIGHT_SUFFIX)).is_file() { Some(name) } else { None }
      })
      .collect::<Vec<_>>();
    name_order.sort();
    let name_to_idx_map = name_order.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();

    Ok(DynLayout { dir, name_order, name_to_idx_map, sampling: Sampling::default() })
  }

  pub fn with_sampling(mut self, sampling: Sampling) -> Self {
    self.sampling = sampling;
    self
  }

  pub fn files(&self, idx: usize) -> Result<(PathBuf, PathBuf)> {
    let name = self.index_to_name(idx)?;
    Ok((
      self.dir.join(format!("{}{}", name, CREW_SUFFIX)),
      self.dir.join(format!("{}{}", name, FLIGHT_SUFFIX)),
    ))
  }
}

impl IdxNameMap for DynLayout {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.check_idx(idx)?;
    Ok(Cow::Borrowed(&self.name_order[idx]))
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    let idx = *self.name_to_idx_map.get(name).ok_or(Error::UnknownInstanceName)?;
    Ok(idx)
  }

  fn len(&self) -> usize { self.name_order.len() }
}

impl Dataset for DynLayout {
  type Instance = CrewInstance;

  fn load_instance(&self, idx: usize) -> Result<CrewInstance> {
    let (crew, flights) = self.files(idx)?;
    let name = self.index_to_name(idx)?;
    load_csv(&crew, &flights, name, &self.sampling)
  }
}

/// Load an instance from a crew table and a flight table.
pub fn load_csv(crew: &Path, flights: &Path, id: Cow<str>, sampling: &Sampling) -> Result<CrewInstance> {
  let raw = RawTables::parse(CsvFmt { crew, flights })?;
  load_from_tables(raw, id, sampling).with_context(|| format!("failed to load {:?} and {:?}", crew, flights))
}


#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/sample");

  #[test]
  fn discover_sample() -> Result<()> {
    let layout = DynLayout::new(SAMPLE_DIR)?;
    assert_eq!(layout.len(), 1);
    assert_eq!(layout.index_to_name(0)?, "sample");
    assert_eq!(layout.name_to_index("sample")?, 0);
    assert!(layout.name_to_index("missing").is_err());
    assert!(layout.index_to_name(1).is_err());
    Ok(())
  }

  #[test]
  fn load_sample() -> Result<()> {
    let data = DynLayout::new(SAMPLE_DIR)?.load_instance(0)?;
    assert_eq!(data.id, "sample");
    assert_eq!(data.crew.len(), 4);
    assert_eq!(data.flights.len(), 6);
    assert_eq!(data.bases().into_iter().collect::<Vec<_>>(), vec!["HOM", "NKX"]);
    Ok(())
  }

  #[test]
  fn load_sample_sampled() -> Result<()> {
    let layout = DynLayout::new(SAMPLE_DIR)?.with_sampling(Sampling { crew_stride: 2, flight_stride: 3 });
    let data = layout.load_instance(0)?;
    assert_eq!(data.crew.len(), 2);
    assert_eq!(data.flights.len(), 2);
    Ok(())
  }
}
