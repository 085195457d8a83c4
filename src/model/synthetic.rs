//! A small model built from fixed values, for checking that the solver works.
use super::params::Params;
use super::{FormulationOptions, RetirementModel};
use crate::plant::PlantCode;
use crate::site::SiteID;
use ndarray::{Array1, Array2};

/// The first year of the smoke test model
const START_YEAR: u32 = 2020;
const NUM_YEARS: usize = 10;
const NUM_COAL_UNITS: usize = 5;
const NUM_SITES: usize = 10;

impl RetirementModel {
    /// Build the smoke test model.
    ///
    /// Every coal unit has 1 MW of capacity generating 8760 MWh a year, and every site has a
    /// capacity factor of 0.75 with room for 10 MW. Health damages and employment factors are
    /// all zero.
    pub fn smoke_test() -> Self {
        let years = (START_YEAR..).take(NUM_YEARS).collect();
        let sites = (0..NUM_SITES)
            .map(|r| SiteID::from(r.to_string()))
            .collect();
        let units = (0..NUM_COAL_UNITS)
            .map(|c| PlantCode::from(c.to_string()))
            .collect();

        let ones_c = Array1::<f64>::ones(NUM_COAL_UNITS);
        let ones_r = Array1::<f64>::ones(NUM_SITES);
        let params = Params {
            hist_gen: &ones_c * 8760.0,
            coal_cap: ones_c.clone(),
            cf: &ones_r * 0.75,
            re_capex: ones_r.clone(),
            re_fopex: ones_r.clone(),
            coal_vopex: ones_c.clone(),
            coal_fopex: ones_c.clone(),
            max_cap: Array2::from_elem((NUM_SITES, NUM_COAL_UNITS), 10.0),
            site_max_cap: &ones_r * 10.0,
            max_sites: &ones_c * 10.0,
            hd: Array1::zeros(NUM_COAL_UNITS),
            ret_ef: Array1::zeros(NUM_COAL_UNITS),
            con_ef: Array2::zeros((NUM_SITES, NUM_YEARS)),
            coal_om_ef: Array1::zeros(NUM_COAL_UNITS),
            re_om_ef: Array2::zeros((NUM_SITES, NUM_YEARS)),
        };

        Self {
            years,
            sites,
            units,
            params,
            options: FormulationOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_test_model_is_valid() {
        let model = RetirementModel::smoke_test();
        model.validate().unwrap();
        assert_eq!(model.years.first(), Some(&2020));
        assert_eq!(model.years.last(), Some(&2029));
        assert_eq!(model.params.max_cap.shape(), &[NUM_SITES, NUM_COAL_UNITS]);
        assert_eq!(model.params.con_ef.shape(), &[NUM_SITES, NUM_YEARS]);
    }
}
