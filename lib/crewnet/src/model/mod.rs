//! The crew assignment model handed to the optimization engine.
//!
//! Variables (all binary):
//!  - `x[i,j,r]`: crew `r` flies connection `i -> j`, one per surviving arc and crew member,
//!  - `z[i,r,k]`: crew `r` serves flight `i` in role `k`,
//!  - `w[i]`: flight `i` is staffed with one captain and one first officer.
//!
//! The objective maximises the number of staffed physical flights.  Variables are laid out densely
//! (all `x`, then all `z`, then all `w`) so a [`VarId`] is just a position.

use std::collections::HashMap;
use std::fmt;
use itertools::Itertools;
use tracing::*;

use crate::*;
use crate::data::*;
use crate::network::{Arc, Network};
use crate::roles::{Role, RoleMatrix};

pub mod check;
pub mod lp;

pub type VarId = usize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Var {
  X(FlightIdx, FlightIdx, CrewIdx),
  Z(FlightIdx, CrewIdx, Role),
  W(FlightIdx),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sense {
  Le,
  Eq,
}

impl fmt::Display for Sense {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Sense::Le => f.write_str("<="),
      Sense::Eq => f.write_str("="),
    }
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstrGroup {
  /// At most one departure from the crew member's home anchor.
  FlowOut,
  /// Returns to the home anchor equal departures from it.
  FlowIn,
  /// Arrivals equal departures at every other flight.
  FlowConservation,
  /// Flying out of a flight means holding exactly one role on it.
  RoleLink,
  RoleEligibility,
  CaptainStaffing,
  FirstOfficerStaffing,
}

impl ConstrGroup {
  pub fn label(self) -> &'static str {
    match self {
      ConstrGroup::FlowOut => "flow_out",
      ConstrGroup::FlowIn => "flow_in",
      ConstrGroup::FlowConservation => "flow_cons",
      ConstrGroup::RoleLink => "role_link",
      ConstrGroup::RoleEligibility => "role_elig",
      ConstrGroup::CaptainStaffing => "captain",
      ConstrGroup::FirstOfficerStaffing => "first_officer",
    }
  }
}

/// `sum(coef * var) <sense> rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
  pub group: ConstrGroup,
  pub name: String,
  pub terms: Vec<(VarId, i32)>,
  pub sense: Sense,
  pub rhs: i32,
}

#[derive(Debug, Clone)]
pub struct Model {
  pub name: String,
  flight_ids: Vec<String>,
  crew_ids: Vec<String>,
  anchors: Vec<bool>,
  arcs: Vec<Arc>,
  arc_pos: Map<Arc, usize>,
  pub constraints: Vec<Constraint>,
  /// Maximised.
  pub objective: Vec<(VarId, i32)>,
}

impl Model {
  #[inline]
  fn num_flights(&self) -> usize { self.flight_ids.len() }

  #[inline]
  fn num_crew(&self) -> usize { self.crew_ids.len() }

  #[inline]
  fn num_x(&self) -> usize { self.arcs.len() * self.num_crew() }

  #[inline]
  fn num_z(&self) -> usize { self.num_flights() * self.num_crew() * Role::ALL.len() }

  pub fn num_vars(&self) -> usize {
    self.num_x() + self.num_z() + self.num_flights()
  }

  pub fn arcs(&self) -> &[Arc] { &self.arcs }

  pub fn is_anchor(&self, i: FlightIdx) -> bool { self.anchors[i as usize] }

  pub fn var_id(&self, var: Var) -> Option<VarId> {
    let (nf, nc) = (self.num_flights(), self.num_crew());
    match var {
      Var::X(i, j, r) if (r as usize) < nc => {
        self.arc_pos.get(&(i, j)).map(|&pos| pos * nc + r as usize)
      }
      Var::Z(i, r, k) if (i as usize) < nf && (r as usize) < nc => {
        Some(self.num_x() + (i as usize * nc + r as usize) * Role::ALL.len() + k.column())
      }
      Var::W(i) if (i as usize) < nf => Some(self.num_x() + self.num_z() + i as usize),
      _ => None,
    }
  }

  pub fn var(&self, id: VarId) -> Option<Var> {
    let nc = self.num_crew();
    let (nx, nz) = (self.num_x(), self.num_z());
    if id < nx {
      let (i, j) = self.arcs[id / nc];
      Some(Var::X(i, j, (id % nc) as CrewIdx))
    } else if id < nx + nz {
      let t = id - nx;
      let k = Role::ALL[t % Role::ALL.len()];
      let t = t / Role::ALL.len();
      Some(Var::Z((t / nc) as FlightIdx, (t % nc) as CrewIdx, k))
    } else if id < self.num_vars() {
      Some(Var::W((id - nx - nz) as FlightIdx))
    } else {
      None
    }
  }

  pub fn vars(&self) -> impl Iterator<Item=Var> + '_ {
    (0..self.num_vars()).filter_map(move |id| self.var(id))
  }

  pub fn var_name(&self, var: Var) -> String {
    match var {
      Var::X(i, j, r) =>
        format!("x_{}_{}_{}", self.flight_ids[i as usize], self.flight_ids[j as usize], self.crew_ids[r as usize]),
      Var::Z(i, r, k) =>
        format!("z_{}_{}_{}", self.flight_ids[i as usize], self.crew_ids[r as usize], k),
      Var::W(i) => format!("w_{}", self.flight_ids[i as usize]),
    }
  }

  pub fn size_info(&self) -> HashMap<String, isize> {
    let mut info = HashMap::default();
    info.insert("x_vars".to_string(), self.num_x() as isize);
    info.insert("z_vars".to_string(), self.num_z() as isize);
    info.insert("w_vars".to_string(), self.num_flights() as isize);
    info.insert("constraints".to_string(), self.constraints.len() as isize);
    for (group, members) in &self.constraints.iter().group_by(|c| c.group) {
      *info.entry(format!("{}_constraints", group.label())).or_insert(0) += members.count() as isize;
    }
    info
  }
}


struct ConstraintSink {
  constraints: Vec<Constraint>,
  trivial: usize,
}

impl ConstraintSink {
  /// Constraints without terms that hold trivially (`0 = 0`, `0 <= 1`) are dropped.
  fn push(&mut self, group: ConstrGroup, name: String, terms: Vec<(VarId, i32)>, sense: Sense, rhs: i32) {
    if terms.is_empty() {
      let holds = match sense {
        Sense::Le => 0 <= rhs,
        Sense::Eq => 0 == rhs,
      };
      if holds {
        trace!(%name, "trivial constraint dropped");
        self.trivial += 1;
        return;
      }
    }
    self.constraints.push(Constraint { group, name, terms, sense, rhs });
  }
}

/// Assemble the assignment model over the (reduced) network.
#[instrument(level = "info", name = "assemble_model", skip(network, roles), fields(data_id = %network.data.id))]
pub fn assemble(network: &Network, roles: &RoleMatrix) -> Result<Model, Error> {
  let data = network.data;
  let nf = data.flights.len();
  let nc = data.crew.len();
  debug_assert_eq!(roles.len(), nc);

  let anchor_of: Map<&str, FlightIdx> = data.anchors().map(|(k, f)| (f.id.as_str(), k)).collect();
  let home = data.crew.iter()
    .map(|c| anchor_of.get(c.base.as_str())
      .copied()
      .ok_or_else(|| Error::MissingAnchor { crew: c.id.clone(), base: c.base.clone() }))
    .collect::<Result<Vec<FlightIdx>, Error>>()?;

  let arcs = network.sorted_arcs();
  let arc_pos: Map<Arc, usize> = arcs.iter().enumerate().map(|(k, &a)| (a, k)).collect();
  // out_arcs[i] / in_arcs[j] hold arc positions
  let mut out_arcs = vec![Vec::new(); nf];
  let mut in_arcs = vec![Vec::new(); nf];
  for (pos, &(i, j)) in arcs.iter().enumerate() {
    out_arcs[i as usize].push(pos);
    in_arcs[j as usize].push(pos);
  }

  let mut model = Model {
    name: data.id.clone(),
    flight_ids: data.flights.iter().map(|f| f.id.clone()).collect(),
    crew_ids: data.crew.iter().map(|c| c.id.clone()).collect(),
    anchors: data.flights.iter().map(Flight::is_anchor).collect(),
    arcs,
    arc_pos,
    constraints: Vec::new(),
    objective: Vec::new(),
  };

  let nx = model.num_x();
  let x = |pos: usize, r: usize| pos * nc + r;
  let z = |i: usize, r: usize, k: Role| nx + (i * nc + r) * Role::ALL.len() + k.column();
  let w = |i: usize| nx + nf * nc * Role::ALL.len() + i;
  let name = move |i: usize| data.flights[i].id.as_str();

  let mut sink = ConstraintSink { constraints: Vec::new(), trivial: 0 };

  for (r, c) in data.crew.iter().enumerate() {
    let h = home[r] as usize;
    let out: Vec<_> = out_arcs[h].iter().map(|&pos| (x(pos, r), 1)).collect();
    let balance = out.iter().copied()
      .chain(in_arcs[h].iter().map(|&pos| (x(pos, r), -1)))
      .collect();
    sink.push(ConstrGroup::FlowOut, format!("flow_out_{}", c.id), out, Sense::Le, 1);
    sink.push(ConstrGroup::FlowIn, format!("flow_in_{}", c.id), balance, Sense::Eq, 0);
  }

  for (r, c) in data.crew.iter().enumerate() {
    for j in (0..nf).filter(|&j| j != home[r] as usize) {
      let terms = in_arcs[j].iter().map(|&pos| (x(pos, r), 1))
        .chain(out_arcs[j].iter().map(|&pos| (x(pos, r), -1)))
        .collect();
      sink.push(ConstrGroup::FlowConservation, format!("flow_cons_{}_{}", name(j), c.id), terms, Sense::Eq, 0);
    }
  }

  for (r, c) in data.crew.iter().enumerate() {
    for i in 0..nf {
      let terms = out_arcs[i].iter().map(|&pos| (x(pos, r), 1))
        .chain(Role::ALL.iter().map(|&k| (z(i, r, k), -1)))
        .collect();
      sink.push(ConstrGroup::RoleLink, format!("role_link_{}_{}", name(i), c.id), terms, Sense::Eq, 0);
    }
  }

  for (r, c) in data.crew.iter().enumerate() {
    for &k in &Role::ALL {
      let eligible = roles.get(r as CrewIdx, k) as i32;
      for i in 0..nf {
        sink.push(ConstrGroup::RoleEligibility, format!("role_elig_{}_{}_{}", c.id, name(i), k), vec![(z(i, r, k), 1)], Sense::Le, eligible);
      }
    }
  }

  for i in 0..nf {
    for &(k, group) in &[(Role::Captain, ConstrGroup::CaptainStaffing), (Role::FirstOfficer, ConstrGroup::FirstOfficerStaffing)] {
      let terms = (0..nc).map(|r| (z(i, r, k), 1))
        .chain(std::iter::once((w(i), -1)))
        .collect();
      sink.push(group, format!("{}_{}", group.label(), name(i)), terms, Sense::Eq, 0);
    }
  }

  model.objective = (0..nf)
    .filter(|&i| !data.flights[i].is_anchor())
    .map(|i| (w(i), 1))
    .collect();
  model.constraints = sink.constraints;

  info!(vars = model.num_vars(), constraints = model.constraints.len(), dropped = sink.trivial, "model assembled");
  Ok(model)
}
