//! Fixtures for tests

use crate::model::params::Params;
use crate::model::{FormulationOptions, RetirementModel};
use crate::plant::{CoalPlant, CoalPlantMap, CoalUnit, CoalUnitMap, PlantCode};
use crate::site::{RenewableSite, RenewableSiteMap, SiteID};
use crate::units::{
    Capacity, Dimensionless, Energy, MoneyPerCapacity, MoneyPerCapacityPerYear, MoneyPerEnergy,
};
use ndarray::{Array1, Array2, array};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn coal_plants() -> CoalPlantMap {
    let plant = |code: &str, generation: Option<f64>, health_damage: Option<f64>| {
        let plant = CoalPlant {
            code: code.into(),
            state: "OH".into(),
            capacity: Capacity(1.0),
            generation: generation.map(Energy),
            health_damage: health_damage.map(MoneyPerEnergy),
        };
        (plant.code.clone(), plant)
    };

    [
        plant("1", Some(1000.0), Some(0.1)),
        plant("2", None, Some(0.2)),
        plant("3", Some(3000.0), None),
        plant("4", Some(4000.0), Some(0.4)),
    ]
    .into_iter()
    .collect()
}

#[fixture]
pub fn coal_units() -> CoalUnitMap {
    let unit = |code: &str, capacity: f64, generation: f64| {
        let unit = CoalUnit {
            code: code.into(),
            capacity: Capacity(capacity),
            generation: Energy(generation),
            health_damage: MoneyPerEnergy(0.05),
        };
        (unit.code.clone(), unit)
    };

    [unit("1", 1.0, 1000.0), unit("4", 2.0, 4000.0)]
        .into_iter()
        .collect()
}

#[fixture]
pub fn renewable_sites() -> RenewableSiteMap {
    let site = |id: &str, cf: f64, max_capacity: Option<f64>| {
        let site = RenewableSite {
            id: id.into(),
            annual_cf: Dimensionless(cf),
            capital_cost: MoneyPerCapacity(1600.0),
            fixed_operating_cost: MoneyPerCapacityPerYear(20.0),
            max_capacity: max_capacity.map(Capacity),
        };
        (site.id.clone(), site)
    };

    [
        site("a", 0.5, None),
        site("b", 0.25, None),
        site("c", 0.75, Some(20.0)),
    ]
    .into_iter()
    .collect()
}

/// Parameters for 2 years, 3 sites and 2 coal units
#[fixture]
pub fn params() -> Params {
    Params {
        hist_gen: array![1000.0, 4000.0],
        coal_cap: array![1.0, 2.0],
        cf: array![0.5, 0.25, 0.75],
        re_capex: array![1600.0, 1700.0, 1650.0],
        re_fopex: array![20.0, 40.0, 25.0],
        coal_vopex: Array1::from_elem(2, 28.2),
        coal_fopex: Array1::from_elem(2, 40.0),
        max_cap: Array2::from_elem((3, 2), 100.0),
        site_max_cap: array![100.0, 100.0, 20.0],
        max_sites: Array1::from_elem(2, 2.0),
        hd: array![0.05, 0.1],
        ret_ef: Array1::from_elem(2, 0.25),
        con_ef: Array2::from_elem((3, 2), 0.25),
        coal_om_ef: Array1::from_elem(2, 1.0),
        re_om_ef: Array2::from_elem((3, 2), 0.25),
    }
}

/// A model with 2 years, 3 sites and 2 coal units
#[fixture]
pub fn model(params: Params) -> RetirementModel {
    RetirementModel {
        years: vec![2020, 2021],
        sites: ["a", "b", "c"].into_iter().map(SiteID::from).collect(),
        units: ["1", "4"].into_iter().map(PlantCode::from).collect(),
        params,
        options: FormulationOptions::default(),
    }
}
