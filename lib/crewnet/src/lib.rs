use std::fmt;
use std::path::Path;
use fnv::{FnvHashMap, FnvHashSet};

pub mod data;
pub mod engine;
pub mod model;
pub mod network;
pub mod roles;

pub type Map<K, V> = FnvHashMap<K, V>;
pub type Set<T> = FnvHashSet<T>;

/// Configuration errors detected while preparing the network and model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The arc ceiling is below the number of anchor arcs, which are never pruned.
    ArcBudgetTooSmall { max_arcs: usize, anchor_arcs: usize },
    /// The reducer did not reach the arc ceiling within its iteration cap.
    IterationLimit { max_iterations: usize, arcs: usize, max_arcs: usize },
    /// A crew member's base has no anchor flight in the network.
    MissingAnchor { crew: String, base: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArcBudgetTooSmall { max_arcs, anchor_arcs } =>
                write!(f, "arc budget {} is below the {} anchor arcs, which cannot be removed", max_arcs, anchor_arcs),
            Error::IterationLimit { max_iterations, arcs, max_arcs } =>
                write!(f, "arc reduction stopped after {} iterations with {} arcs left (budget {})", max_iterations, arcs, max_arcs),
            Error::MissingAnchor { crew, base } =>
                write!(f, "crew {} has base {} but there is no anchor flight for it", crew, base),
        }
    }
}

impl std::error::Error for Error {}


mod logging_setup {
    use super::*;
    use anyhow::Context;
    use tracing_subscriber::{EnvFilter, fmt, registry, prelude::*};
    use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
    use std::fs::OpenOptions;

    fn build_and_set_global_subscriber<P>(logfile: Option<P>, is_test : bool) -> anyhow::Result<Option<WorkerGuard>> where
        P : AsRef<Path>
    {
        let stderr_log = fmt::layer().with_writer(std::io::stderr);
        let env_filter = EnvFilter::from_default_env();
        let r = registry().with(stderr_log).with(env_filter);

        let flush_guard = match logfile {
            Some(p) => {
                let p = p.as_ref();
                let logfile = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(p)
                    .with_context(|| format!("failed to open log file {:?}", p))?;
                let (writer, _guard) = non_blocking::NonBlockingBuilder::default()
                    .lossy(false)
                    .finish(logfile);
                let json = fmt::layer()
                    .json()
                    .with_span_list(true)
                    .with_current_span(false)
                    .with_writer(writer);

                let r = r.with(json);
                if is_test { r.try_init().ok(); }
                else { r.init(); }
                Some(_guard)
            },
            None => {
                if is_test { r.try_init().ok(); }
                else { r.init(); }
                None
            }
        };
        Ok(flush_guard)
    }

    pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> anyhow::Result<Option<WorkerGuard>> {
        build_and_set_global_subscriber(logfile, false)
    }

    #[allow(dead_code)]
    pub(crate) fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> Option<WorkerGuard> {
        build_and_set_global_subscriber(logfile, true).ok().flatten()
    }
}
pub use logging_setup::*;
