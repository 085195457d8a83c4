//! The equitable retirement model: index sets plus the parameter bundle.
use crate::optimisation::{ObjectiveWeights, Output, SolverBackend, perform_optimisation};
use crate::plant::PlantCode;
use crate::site::SiteID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use log::info;

pub mod parameters;
pub mod params;
use params::{Params, Shape};
pub mod synthetic;

/// Options controlling the shape of the optimisation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulationOptions {
    /// Whether all coal units must be retired by the final year
    pub retire_all_by_final_year: bool,
    /// Whether site selection is binary (otherwise it is relaxed to a fraction)
    pub integer_site_selection: bool,
}

impl Default for FormulationOptions {
    fn default() -> Self {
        Self {
            retire_all_by_final_year: true,
            integer_site_selection: true,
        }
    }
}

/// A coal retirement and renewable replacement model, ready to solve
#[derive(Debug, Clone, PartialEq)]
pub struct RetirementModel {
    /// The years modelled (Y)
    pub years: Vec<u32>,
    /// Candidate renewable sites (R)
    pub sites: IndexSet<SiteID>,
    /// Coal units considered for retirement (C)
    pub units: IndexSet<PlantCode>,
    /// Parameters for the optimisation
    pub params: Params,
    /// Options controlling the shape of the optimisation problem
    pub options: FormulationOptions,
}

impl RetirementModel {
    /// The name and shape of the index sets and every parameter.
    ///
    /// Index sets come first, then the parameters in the same order as [`Params::shapes`].
    pub fn dimensions(&self) -> impl Iterator<Item = (&'static str, Shape)> {
        [
            ("Y", Shape(vec![self.years.len()])),
            ("R", Shape(vec![self.sites.len()])),
            ("C", Shape(vec![self.units.len()])),
        ]
        .into_iter()
        .chain(self.params.shapes())
    }

    /// Log the dimensions of the model for inspection
    pub fn log_dimensions(&self) {
        for (name, shape) in self.dimensions() {
            info!("{name:<10} {shape}");
        }
    }

    /// Check that the model is dimensionally consistent.
    ///
    /// The index sets must be non-empty and years must be consecutive. All parameters must match
    /// the lengths of the index sets.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.years.is_empty(), "Model must have at least one year");
        ensure!(
            !self.sites.is_empty(),
            "Model must have at least one renewable site"
        );
        ensure!(!self.units.is_empty(), "Model must have at least one coal unit");
        ensure!(
            self.years.windows(2).all(|w| w[0].checked_add(1) == Some(w[1])),
            "Years must be consecutive and in order"
        );

        self.params
            .validate(self.years.len(), self.sites.len(), self.units.len())
            .context("Invalid model parameters")
    }

    /// Validate the model, then solve it.
    ///
    /// # Arguments
    ///
    /// * `weights` - Weights for the cost, health and jobs components of the objective
    /// * `backend` - The solver backend to use
    pub fn solve(&self, weights: &ObjectiveWeights, backend: SolverBackend) -> Result<Output> {
        self.validate()?;
        weights.validate()?;
        perform_optimisation(self, weights, backend)
    }
}
