use json;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use itertools::Itertools;
use anyhow::{Context, Result};
use tracing::*;

use crewnet::*;
use crewnet::data::{load_instance, CrewInstance, Sampling};
use crewnet::engine::EngineParams;
use crewnet::model::{assemble, lp::write_lp, Model};
use crewnet::network::{add_anchors, build_network, ArcBudget, Network};
use crewnet::roles::RoleMatrix;

mod common;
use common::*;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct ClArgs {
    /// Crew table (CSV).
    #[structopt(parse(from_os_str))]
    crew: PathBuf,
    /// Flight table (CSV).
    #[structopt(parse(from_os_str))]
    flights: PathBuf,
    /// Worker threads for arc generation, 0 means one per physical core.
    #[structopt(long, short="c", default_value="0")]
    cpus: usize,
    #[structopt(flatten)]
    sampling: SamplingOptions,
    #[structopt(flatten)]
    budget: BudgetOptions,
    #[structopt(flatten)]
    engine: EngineOptions,
    #[structopt(flatten)]
    output: OutputOptions,
}

struct Report<'a> {
    network: Network<'a>,
    roles: RoleMatrix,
    model: Model,
}

impl<'a> Report<'a> {
    fn size_info(&self) -> HashMap<String, isize> {
        let mut info = self.network.size_info.clone();
        info.insert("physical_flights".to_string(), self.network.data.num_physical_flights() as isize);
        info.insert("kept_anchor_arcs".to_string(), self.network.num_anchor_arcs() as isize);
        info.extend(self.model.size_info());
        info
    }
}

fn flight_ids(data: &CrewInstance, idx: &[u32]) -> json::JsonValue {
    idx.iter().map(|&i| data.flights[i as usize].id.as_str()).collect_vec().into()
}

impl<'a> NetworkOutput for Report<'a> {
    fn write_json(&self, mut buf: impl Write) -> Result<()> {
        let data = self.network.data;
        let arcs: json::JsonValue = self.network.sorted_arcs().into_iter()
            .map(|(i, j)| json::array![data.flights[i as usize].id.as_str(), data.flights[j as usize].id.as_str()])
            .collect_vec()
            .into();
        let roles: json::JsonValue = data.crew.iter()
            .enumerate()
            .map(|(r, c)| json::object! {
                crew: c.id.as_str(),
                base: c.base.as_str(),
                roles: self.roles.row(r as u32).to_vec(),
            })
            .collect_vec()
            .into();
        let q = self.roles.qualifications();
        let crew_ids = |idx: &[u32]| -> json::JsonValue {
            idx.iter().map(|&r| data.crew[r as usize].id.as_str()).collect_vec().into()
        };
        let anchors: Vec<u32> = data.anchors().map(|(i, _)| i).collect();

        let root = json::object! {
            sizes: self.size_info(),
            anchors: flight_ids(data, &anchors),
            arcs: arcs,
            roles: roles,
            captains: crew_ids(&q.captains),
            first_officers: crew_ids(&q.first_officers),
            first_officer_only: crew_ids(&q.first_officer_only),
            dual_qualified: crew_ids(&q.dual_qualified),
        };
        root.write_pretty(&mut buf, 2)?;
        return Ok(())
    }

    fn write_json_summary(&self, mut buf : impl Write) -> Result<()> {
        let root: json::JsonValue = self.size_info().into();
        root.write_pretty(&mut buf, 2)?;
        return Ok(())
    }
}


fn main() -> anyhow::Result<()> {
    let args : ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.clone())?;
    debug!(?args);
    let cpus = if args.cpus == 0 { num_cpus::get_physical() } else { args.cpus };
    ThreadPoolBuilder::new().num_threads(cpus).build_global().context("failed to construct thread pool")?;

    let sampling = Sampling::from(&args.sampling);
    let mut data = load_instance(&args.crew, &args.flights, &sampling)?;
    add_anchors(&mut data)?;
    let data = data;

    let budget = ArcBudget::from(&args.budget);
    let network = build_network(&data, if args.budget.reduce { Some(&budget) } else { None })?;
    let roles = RoleMatrix::build(&data.crew);
    let model = assemble(&network, &roles)?;

    if let Some(path) = args.output.lp.as_ref() {
        let params = EngineParams::from(&args.engine);
        let file = std::fs::File::create(path).with_context(|| format!("failed to create {:?}", path))?;
        write_lp(&model, &params, std::io::BufWriter::new(file))?;
        info!(path = ?path, "model written");
    }

    output_network(&args.output, &Report { network, roles, model })?;
    Ok(())
}
