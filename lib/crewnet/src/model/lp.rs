//! CPLEX LP export of an assembled [`Model`].
use std::io::Write;
use anyhow::Context;

use super::*;
use crate::engine::EngineParams;

const TERMS_PER_LINE: usize = 8;

/// LP names may not contain `-`, `/` or other operators; map them to `_`.
fn lp_name(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
    .collect()
}

/// Sanitised copies of `names`, in order.  Two distinct names that sanitise to the same LP name
/// (`A-1` and `A_1`) are rejected, since the LP would silently merge them.
fn lp_names(kind: &str, names: impl Iterator<Item=String>) -> anyhow::Result<Vec<String>> {
  let mut seen: Map<String, String> = Map::default();
  let mut out = Vec::new();
  for name in names {
    let sanitised = lp_name(&name);
    if let Some(prev) = seen.get(&sanitised) {
      anyhow::bail!("{} names {:?} and {:?} both map to LP name {:?}", kind, prev, name, sanitised);
    }
    seen.insert(sanitised.clone(), name);
    out.push(sanitised);
  }
  Ok(out)
}

fn write_terms(out: &mut impl Write, names: &[String], terms: &[(VarId, i32)]) -> std::io::Result<()> {
  if terms.is_empty() {
    // LP rows need at least one variable
    return match names.first() {
      Some(name) => write!(out, " 0 {}", name),
      None => Ok(()),
    };
  }
  for (k, &(v, coef)) in terms.iter().enumerate() {
    if k > 0 && k % TERMS_PER_LINE == 0 {
      write!(out, "\n  ")?;
    }
    let sign = if coef < 0 { '-' } else { '+' };
    match coef.abs() {
      1 => write!(out, " {} {}", sign, names[v])?,
      c => write!(out, " {} {} {}", sign, c, names[v])?,
    }
  }
  Ok(())
}

/// Write the model in CPLEX LP format.  Nothing is written if the names do not sanitise uniquely.
#[instrument(level = "info", skip(model, params, out), fields(model = %model.name))]
pub fn write_lp(model: &Model, params: &EngineParams, mut out: impl Write) -> anyhow::Result<()> {
  let var_names = lp_names("variable", model.vars().map(|v| model.var_name(v)))?;
  let constr_names = lp_names("constraint", model.constraints.iter().map(|c| c.name.clone()))?;

  writeln!(out, "\\ model {}", model.name)?;
  writeln!(out, "\\ CutLevel {} HeurLevel {}", params.cut_level, params.heur_level)?;
  writeln!(out, "Maximize")?;
  write!(out, " obj:")?;
  write_terms(&mut out, &var_names, &model.objective)?;
  writeln!(out)?;

  writeln!(out, "Subject To")?;
  for (c, name) in model.constraints.iter().zip(&constr_names) {
    write!(out, " {}:", name)?;
    write_terms(&mut out, &var_names, &c.terms)?;
    writeln!(out, " {} {}", c.sense, c.rhs)?;
  }

  writeln!(out, "Binaries")?;
  for mut chunk in &var_names.iter().chunks(TERMS_PER_LINE) {
    writeln!(out, " {}", chunk.join(" "))?;
  }
  writeln!(out, "End")?;
  out.flush().context("failed to flush LP output")?;
  debug!(vars = model.num_vars(), constraints = model.constraints.len(), "LP written");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::fixtures::*;
  use crate::network::{add_anchors, build_network};

  fn model_for(crew_list: Vec<Crew>) -> Model {
    let mut data = instance(
      crew_list,
      vec![
        flight("FA1", 3, "NKX", 480, "TGD", 540),
        flight("FA2", 3, "TGD", 600, "NKX", 660),
      ],
    );
    add_anchors(&mut data).unwrap();
    let network = build_network(&data, None).unwrap();
    assemble(&network, &RoleMatrix::build(&data.crew)).unwrap()
  }

  fn lp_text() -> String {
    let model = model_for(vec![crew("A0001", true, true, true, "NKX")]);
    let mut buf = Vec::new();
    write_lp(&model, &EngineParams::default(), &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn sections_in_order() {
    let lp = lp_text();
    let pos: Vec<_> = ["Maximize", "Subject To", "Binaries", "End"].iter()
      .map(|s| lp.find(s).unwrap())
      .collect();
    assert!(pos.windows(2).all(|w| w[0] < w[1]), "{}", lp);
    assert!(lp.contains("CutLevel 0 HeurLevel 3"));
  }

  #[test]
  fn names_are_sanitised() {
    let lp = lp_text();
    assert!(lp.contains(" obj: + w_FA1_3 + w_FA2_3\n"), "{}", lp);
    assert!(lp.contains("x_NKX_FA1_3_A0001"));
    assert!(!lp.lines().skip(2).any(|l| l.contains('-') && !l.contains(" - ")), "{}", lp);
  }

  #[test]
  fn constraint_lines() {
    let lp = lp_text();
    assert!(lp.contains(" flow_out_A0001: + x_NKX_FA1_3_A0001 <= 1\n"), "{}", lp);
    assert!(lp.contains(" captain_FA1_3: + z_FA1_3_A0001_1 - w_FA1_3 = 0\n"), "{}", lp);
  }

  #[test]
  fn colliding_names_rejected() {
    let model = model_for(vec![
      crew("A-1", true, false, true, "NKX"),
      crew("A_1", false, true, true, "NKX"),
    ]);
    let mut buf = Vec::new();
    let err = write_lp(&model, &EngineParams::default(), &mut buf).unwrap_err();
    assert!(err.to_string().contains("both map to LP name"), "{}", err);
    assert!(buf.is_empty());
  }

  #[test]
  fn distinct_names_accepted() {
    let model = model_for(vec![
      crew("A-1", true, false, true, "NKX"),
      crew("A-2", false, true, true, "NKX"),
    ]);
    let mut buf = Vec::new();
    write_lp(&model, &EngineParams::default(), &mut buf).unwrap();
    let lp = String::from_utf8(buf).unwrap();
    assert!(lp.contains("flow_out_A_1"));
    assert!(lp.contains("flow_out_A_2"));
  }
}
