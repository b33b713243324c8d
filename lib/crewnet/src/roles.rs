use std::fmt;
use ndarray::Array2;
use tracing::*;

use crate::data::*;

/// Role a crew member holds on a flight.  The discriminant is the role index used in the model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
  Captain = 1,
  FirstOfficer = 2,
  Deadhead = 3,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Captain, Role::FirstOfficer, Role::Deadhead];

  #[inline]
  pub fn index(self) -> u8 { self as u8 }

  #[inline]
  pub(crate) fn column(self) -> usize { self as usize - 1 }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.index())
  }
}

/// Crew × {Captain, FirstOfficer, Deadhead} eligibility, 0 or 1, rows in crew-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMatrix {
  matrix: Array2<u8>,
}

impl RoleMatrix {
  #[instrument(level = "debug", skip(crew), fields(crew = crew.len()))]
  pub fn build(crew: &[Crew]) -> RoleMatrix {
    let matrix = Array2::from_shape_fn((crew.len(), Role::ALL.len()), |(r, k)| {
      let c = &crew[r];
      let certified = match Role::ALL[k] {
        Role::Captain => c.is_captain,
        Role::FirstOfficer => c.is_first_officer,
        Role::Deadhead => c.is_deadhead,
      };
      certified as u8
    });
    RoleMatrix { matrix }
  }

  #[inline]
  pub fn get(&self, r: CrewIdx, role: Role) -> u8 {
    self.matrix[[r as usize, role.column()]]
  }

  #[inline]
  pub fn is_eligible(&self, r: CrewIdx, role: Role) -> bool {
    self.get(r, role) == 1
  }

  pub fn row(&self, r: CrewIdx) -> [u8; 3] {
    let r = r as usize;
    [self.matrix[[r, 0]], self.matrix[[r, 1]], self.matrix[[r, 2]]]
  }

  pub fn len(&self) -> usize { self.matrix.dim().0 }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn crew_where(&self, pred: impl Fn(&[u8; 3]) -> bool) -> Vec<CrewIdx> {
    (0..self.len() as CrewIdx).filter(|&r| pred(&self.row(r))).collect()
  }

  pub fn qualifications(&self) -> Qualifications {
    Qualifications {
      captains: self.crew_where(|row| row[0] == 1),
      first_officers: self.crew_where(|row| row[1] == 1),
      first_officer_only: self.crew_where(|row| row[0] == 0 && row[1] == 1),
      dual_qualified: self.crew_where(|row| row[0] == 1 && row[1] == 1),
    }
  }
}

/// Crew grouped by cockpit qualification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifications {
  pub captains: Vec<CrewIdx>,
  pub first_officers: Vec<CrewIdx>,
  /// First officers that are not also captains.
  pub first_officer_only: Vec<CrewIdx>,
  /// Qualified for both the captain and the first officer seat.
  pub dual_qualified: Vec<CrewIdx>,
}
