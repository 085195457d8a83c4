//! The solver backends which can be used to solve the model.
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

/// A solver backend.
///
/// All backends are provided by HiGHS; they differ in which algorithm is used. The `highs`
/// backend lets HiGHS choose and is the only one which honours integrality. HiGHS ignores the
/// choice of algorithm for integer problems, so the others are given the continuous relaxation
/// of the problem instead.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum SolverBackend {
    /// Let HiGHS choose the algorithm
    #[default]
    #[serde(rename = "highs")]
    #[strum(serialize = "highs")]
    Highs,
    /// The HiGHS dual simplex solver
    #[serde(rename = "highs-simplex")]
    #[strum(serialize = "highs-simplex")]
    HighsSimplex,
    /// The HiGHS interior point solver
    #[serde(rename = "highs-ipm")]
    #[strum(serialize = "highs-ipm")]
    HighsIpm,
}

impl SolverBackend {
    /// Look up a backend by name
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map_err(|_| {
            anyhow!(
                "Unsupported solver backend: {name} (available backends: {})",
                Self::VARIANTS.join(", ")
            )
        })
    }

    /// The value for HiGHS's `solver` option
    pub fn solver_option(self) -> &'static str {
        match self {
            Self::Highs => "choose",
            Self::HighsSimplex => "simplex",
            Self::HighsIpm => "ipm",
        }
    }

    /// Whether integer variables are relaxed to continuous ones with this backend
    pub fn relaxes_integrality(self) -> bool {
        self != Self::Highs
    }

    /// Configure a HiGHS model to use this backend
    pub fn configure(self, model: &mut highs::Model) {
        model.set_option("solver", self.solver_option());
        if self.relaxes_integrality() {
            model.set_option("solve_relaxation", true);
        }
    }
}
