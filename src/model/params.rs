//! The parameter bundle consumed by the optimisation.
use super::parameters::ModelParameters;
use crate::plant::CoalUnitMap;
use crate::site::RenewableSiteMap;
use anyhow::{Result, ensure};
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView, Dimension};
use std::fmt;

/// The shape of a parameter array, displayed like `(10,)` or `(10, 5)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<usize>);

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [n] => write!(f, "({n},)"),
            dims => write!(f, "({})", dims.iter().join(", ")),
        }
    }
}

/// Parameters for the optimisation.
///
/// Vectors are indexed by coal unit (C) or renewable site (R). Matrices are indexed by site then
/// coal unit (R×C) or by site then year (R×Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Historical annual generation of each coal unit (HISTGEN)
    pub hist_gen: Array1<f64>,
    /// Installed capacity of each coal unit (COALCAP)
    pub coal_cap: Array1<f64>,
    /// Annual capacity factor of each site (CF)
    pub cf: Array1<f64>,
    /// Capital cost of renewable capacity at each site (RECAPEX)
    pub re_capex: Array1<f64>,
    /// Fixed operating cost of renewable capacity at each site (REFOPEX)
    pub re_fopex: Array1<f64>,
    /// Variable operating cost of each coal unit (COALVOPEX)
    pub coal_vopex: Array1<f64>,
    /// Fixed operating cost of each coal unit (COALFOPEX)
    pub coal_fopex: Array1<f64>,
    /// Maximum capacity at a site which can replace a coal unit (MAXCAP)
    pub max_cap: Array2<f64>,
    /// Maximum capacity at each site (SITEMAXCAP)
    pub site_max_cap: Array1<f64>,
    /// Maximum number of sites used to replace each coal unit (MAXSITES)
    pub max_sites: Array1<f64>,
    /// Marginal health damage of each coal unit's generation (HD)
    pub hd: Array1<f64>,
    /// Jobs per unit of retired coal capacity (RETEF)
    pub ret_ef: Array1<f64>,
    /// Jobs per unit of renewable capacity built, by site and year (CONEF)
    pub con_ef: Array2<f64>,
    /// Jobs per unit of operating coal capacity (COALOMEF)
    pub coal_om_ef: Array1<f64>,
    /// Jobs per unit of operating renewable capacity, by site and year (REOMEF)
    pub re_om_ef: Array2<f64>,
}

impl Params {
    /// Assemble parameters from coal unit and site data plus scenario assumptions
    pub fn from_inputs(
        units: &CoalUnitMap,
        sites: &RenewableSiteMap,
        num_years: usize,
        parameters: &ModelParameters,
    ) -> Self {
        let n_units = units.len();
        let n_sites = sites.len();
        let units: Vec<_> = units.values().collect();
        let sites: Vec<_> = sites.values().collect();
        let limits = &parameters.limits;
        let employment = &parameters.employment;

        Self {
            hist_gen: units.iter().map(|unit| unit.generation.value()).collect(),
            coal_cap: units.iter().map(|unit| unit.capacity.value()).collect(),
            cf: sites.iter().map(|site| site.annual_cf.value()).collect(),
            re_capex: sites.iter().map(|site| site.capital_cost.value()).collect(),
            re_fopex: sites
                .iter()
                .map(|site| site.fixed_operating_cost.value())
                .collect(),
            coal_vopex: Array1::from_elem(n_units, parameters.coal.variable_operating_cost.value()),
            coal_fopex: Array1::from_elem(n_units, parameters.coal.fixed_operating_cost.value()),
            max_cap: Array2::from_elem((n_sites, n_units), limits.max_capacity.value()),
            site_max_cap: sites
                .iter()
                .map(|site| site.max_capacity.unwrap_or(limits.site_max_capacity).value())
                .collect(),
            max_sites: Array1::from_elem(n_units, f64::from(limits.max_sites)),
            hd: units.iter().map(|unit| unit.health_damage.value()).collect(),
            ret_ef: Array1::from_elem(n_units, employment.retirement.value()),
            con_ef: Array2::from_elem((n_sites, num_years), employment.construction.value()),
            coal_om_ef: Array1::from_elem(n_units, employment.coal_operation.value()),
            re_om_ef: Array2::from_elem(
                (n_sites, num_years),
                employment.renewable_operation.value(),
            ),
        }
    }

    /// The name and shape of every parameter, in a fixed order
    pub fn shapes(&self) -> [(&'static str, Shape); 15] {
        let shape = |s: &[usize]| Shape(s.to_vec());
        [
            ("HISTGEN", shape(self.hist_gen.shape())),
            ("COALCAP", shape(self.coal_cap.shape())),
            ("CF", shape(self.cf.shape())),
            ("RECAPEX", shape(self.re_capex.shape())),
            ("REFOPEX", shape(self.re_fopex.shape())),
            ("COALVOPEX", shape(self.coal_vopex.shape())),
            ("COALFOPEX", shape(self.coal_fopex.shape())),
            ("MAXCAP", shape(self.max_cap.shape())),
            ("SITEMAXCAP", shape(self.site_max_cap.shape())),
            ("MAXSITES", shape(self.max_sites.shape())),
            ("HD", shape(self.hd.shape())),
            ("RETEF", shape(self.ret_ef.shape())),
            ("CONEF", shape(self.con_ef.shape())),
            ("COALOMEF", shape(self.coal_om_ef.shape())),
            ("REOMEF", shape(self.re_om_ef.shape())),
        ]
    }

    /// Check that every parameter has the expected shape and sensible values.
    ///
    /// # Arguments
    ///
    /// * `n_years` - The number of years (Y)
    /// * `n_sites` - The number of renewable sites (R)
    /// * `n_units` - The number of coal units (C)
    pub fn validate(&self, n_years: usize, n_sites: usize, n_units: usize) -> Result<()> {
        let per_unit = [n_units];
        let per_site = [n_sites];
        let site_unit = [n_sites, n_units];
        let site_year = [n_sites, n_years];

        check_param("HISTGEN", self.hist_gen.view(), &per_unit)?;
        check_param("COALCAP", self.coal_cap.view(), &per_unit)?;
        check_param("CF", self.cf.view(), &per_site)?;
        check_param("RECAPEX", self.re_capex.view(), &per_site)?;
        check_param("REFOPEX", self.re_fopex.view(), &per_site)?;
        check_param("COALVOPEX", self.coal_vopex.view(), &per_unit)?;
        check_param("COALFOPEX", self.coal_fopex.view(), &per_unit)?;
        check_param("MAXCAP", self.max_cap.view(), &site_unit)?;
        check_param("SITEMAXCAP", self.site_max_cap.view(), &per_site)?;
        check_param("MAXSITES", self.max_sites.view(), &per_unit)?;
        check_param("HD", self.hd.view(), &per_unit)?;
        check_param("RETEF", self.ret_ef.view(), &per_unit)?;
        check_param("CONEF", self.con_ef.view(), &site_year)?;
        check_param("COALOMEF", self.coal_om_ef.view(), &per_unit)?;
        check_param("REOMEF", self.re_om_ef.view(), &site_year)?;

        ensure!(
            self.cf.iter().all(|cf| *cf <= 1.0),
            "CF values must be between 0 and 1"
        );

        Ok(())
    }
}

/// Check the shape of a parameter and that its values are finite and non-negative
fn check_param<D: Dimension>(
    name: &str,
    values: ArrayView<f64, D>,
    expected: &[usize],
) -> Result<()> {
    ensure!(
        values.shape() == expected,
        "{name} has shape {} but expected {}",
        Shape(values.shape().to_vec()),
        Shape(expected.to_vec())
    );
    ensure!(
        values.iter().all(|value| value.is_finite() && *value >= 0.0),
        "{name} values must be finite and non-negative"
    );

    Ok(())
}
