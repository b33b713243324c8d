//! The seam to the external MIP engine.
//!
//! The engine itself is a black box behind [`Engine`]; this module only fixes the parameters passed
//! through to it and checks what comes back.
use std::fmt;
use tracing::*;

use crate::model::{Model, Var};

/// Engine knobs, passed through unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EngineParams {
  pub cut_level: u8,
  pub heur_level: u8,
}

impl Default for EngineParams {
  fn default() -> Self {
    EngineParams { cut_level: 0, heur_level: 3 }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
  Infeasible,
  Unbounded,
  TimeLimit,
  Engine(String),
  /// The engine reported a solution that violates the model.
  InvalidAssignment { violated: Vec<String> },
  /// The engine's objective disagrees with the objective of its own assignment.
  ObjectiveMismatch { reported: f64, computed: i64 },
}

impl fmt::Display for SolveError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SolveError::Infeasible => f.write_str("model is infeasible"),
      SolveError::Unbounded => f.write_str("model is unbounded"),
      SolveError::TimeLimit => f.write_str("time limit reached without a solution"),
      SolveError::Engine(msg) => write!(f, "engine failure: {}", msg),
      SolveError::InvalidAssignment { violated } =>
        write!(f, "engine solution violates {} constraints (first: {})", violated.len(), violated.first().map(String::as_str).unwrap_or("-")),
      SolveError::ObjectiveMismatch { reported, computed } =>
        write!(f, "engine reported objective {} but the assignment gives {}", reported, computed),
    }
  }
}

impl std::error::Error for SolveError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolveStatus {
  Optimal,
  /// Feasible but not proven optimal.
  Feasible,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
  pub status: SolveStatus,
  pub objective: f64,
  /// One value per model variable, indexed by `VarId`.
  pub values: Vec<bool>,
}

impl Solution {
  pub fn value(&self, model: &Model, var: Var) -> Option<bool> {
    model.var_id(var).and_then(|v| self.values.get(v).copied())
  }

  pub fn ones<'a>(&'a self, model: &'a Model) -> impl Iterator<Item=Var> + 'a {
    self.values.iter()
      .enumerate()
      .filter(|&(_, &val)| val)
      .filter_map(move |(v, _)| model.var(v))
  }

  pub fn verify(&self, model: &Model) -> Result<(), SolveError> {
    if self.values.len() != model.num_vars() {
      return Err(SolveError::Engine(format!("expected {} values, got {}", model.num_vars(), self.values.len())));
    }
    let violated: Vec<String> = model.violations(&self.values).map(|c| c.name.clone()).collect();
    if !violated.is_empty() {
      return Err(SolveError::InvalidAssignment { violated });
    }
    let computed = model.objective_value(&self.values);
    if (self.objective - computed as f64).abs() > 1e-6 {
      return Err(SolveError::ObjectiveMismatch { reported: self.objective, computed });
    }
    Ok(())
  }
}

pub trait Engine {
  fn solve(&self, model: &Model, params: &EngineParams) -> Result<Solution, SolveError>;
}

/// Hand the model to `engine` and check the returned assignment.  Failures are not retried.
#[instrument(level = "info", skip(engine, model), fields(model = %model.name))]
pub fn solve(engine: &impl Engine, model: &Model, params: &EngineParams) -> Result<Solution, SolveError> {
  let solution = engine.solve(model, params)
    .map_err(|e| { error!(%e, "engine failed"); e })?;
  solution.verify(model)?;
  info!(status = ?solution.status, objective = solution.objective, "solved");
  Ok(solution)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::fixtures::*;
  use crate::model::assemble;
  use crate::network::{add_anchors, build_network};
  use crate::roles::RoleMatrix;

  struct Fixed(Result<Solution, SolveError>);

  impl Engine for Fixed {
    fn solve(&self, _: &Model, params: &EngineParams) -> Result<Solution, SolveError> {
      assert_eq!(*params, EngineParams::default());
      self.0.clone()
    }
  }

  fn model() -> Model {
    let mut data = sample();
    add_anchors(&mut data).unwrap();
    let network = build_network(&data, None).unwrap();
    assemble(&network, &RoleMatrix::build(&data.crew)).unwrap()
  }

  #[test]
  fn zero_objective_is_not_infeasible() {
    let model = model();
    let zero = Solution { status: SolveStatus::Optimal, objective: 0.0, values: vec![false; model.num_vars()] };
    let s = solve(&Fixed(Ok(zero.clone())), &model, &EngineParams::default()).unwrap();
    assert_eq!(s, zero);
    assert_eq!(s.ones(&model).count(), 0);

    let err = solve(&Fixed(Err(SolveError::Infeasible)), &model, &EngineParams::default()).unwrap_err();
    assert_eq!(err, SolveError::Infeasible);
  }

  #[test]
  fn rejects_bad_solutions() {
    let model = model();
    let mut values = vec![false; model.num_vars()];
    let (w, _) = model.objective[0];
    values[w] = true;
    let bad = Solution { status: SolveStatus::Feasible, objective: 1.0, values: values.clone() };
    match solve(&Fixed(Ok(bad)), &model, &EngineParams::default()) {
      Err(SolveError::InvalidAssignment { violated }) => assert_eq!(violated.len(), 2),
      other => panic!("unexpected {:?}", other),
    }

    let short = Solution { status: SolveStatus::Optimal, objective: 0.0, values: vec![false; 3] };
    assert!(matches!(short.verify(&model), Err(SolveError::Engine(_))));

    let wrong = Solution { status: SolveStatus::Optimal, objective: 4.0, values: vec![false; model.num_vars()] };
    assert!(matches!(wrong.verify(&model), Err(SolveError::ObjectiveMismatch { computed: 0, .. })));
  }
}
