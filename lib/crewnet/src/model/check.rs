//! Evaluating assignments against an assembled [`Model`].
use super::*;

impl Constraint {
  pub fn lhs(&self, values: &[bool]) -> i32 {
    self.terms.iter()
      .filter(|&&(v, _)| values[v])
      .map(|&(_, coef)| coef)
      .sum()
  }

  pub fn is_satisfied(&self, values: &[bool]) -> bool {
    let lhs = self.lhs(values);
    match self.sense {
      Sense::Le => lhs <= self.rhs,
      Sense::Eq => lhs == self.rhs,
    }
  }
}

impl Model {
  /// Build a full assignment vector with exactly the given variables set.  Returns `None` if a
  /// variable is not part of the model.
  pub fn assignment(&self, ones: impl IntoIterator<Item=Var>) -> Option<Vec<bool>> {
    let mut values = vec![false; self.num_vars()];
    for v in ones {
      values[self.var_id(v)?] = true;
    }
    Some(values)
  }

  pub fn objective_value(&self, values: &[bool]) -> i64 {
    self.objective.iter()
      .filter(|&&(v, _)| values[v])
      .map(|&(_, coef)| coef as i64)
      .sum()
  }

  /// Constraints the assignment violates, in model order.
  pub fn violations<'a>(&'a self, values: &'a [bool]) -> impl Iterator<Item=&'a Constraint> + 'a {
    debug_assert_eq!(values.len(), self.num_vars());
    self.constraints.iter().filter(move |c| !c.is_satisfied(values))
  }

  pub fn is_feasible(&self, values: &[bool]) -> bool {
    values.len() == self.num_vars() && self.violations(values).next().is_none()
  }
}
