//! Coal plants and the coal units considered for retirement.
use crate::id::define_id_type;
use crate::units::{Capacity, Energy, MoneyPerEnergy};
use indexmap::IndexMap;
use log::warn;

define_id_type! {PlantCode}
define_id_type! {StateCode}

/// A plant from the coal plant registry.
///
/// Generation and health damage come from separate tables and may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CoalPlant {
    /// Unique code for the plant
    pub code: PlantCode,
    /// The state in which the plant is located
    pub state: StateCode,
    /// Installed coal capacity
    pub capacity: Capacity,
    /// Historical annual generation
    pub generation: Option<Energy>,
    /// Marginal health damage per unit of generation
    pub health_damage: Option<MoneyPerEnergy>,
}

/// A map of [`CoalPlant`]s, keyed by plant code
pub type CoalPlantMap = IndexMap<PlantCode, CoalPlant>;

/// A coal unit with all the data needed for the optimisation
#[derive(Debug, Clone, PartialEq)]
pub struct CoalUnit {
    /// Unique code for the plant
    pub code: PlantCode,
    /// Installed coal capacity
    pub capacity: Capacity,
    /// Historical annual generation
    pub generation: Energy,
    /// Marginal health damage per unit of generation
    pub health_damage: MoneyPerEnergy,
}

/// A map of [`CoalUnit`]s, keyed by plant code
pub type CoalUnitMap = IndexMap<PlantCode, CoalUnit>;

/// Drop plants with missing generation or health damage data.
///
/// Registry order is preserved. A warning is logged for each plant dropped.
pub fn drop_incomplete(plants: CoalPlantMap) -> CoalUnitMap {
    plants
        .into_iter()
        .filter_map(|(code, plant)| {
            let (Some(generation), Some(health_damage)) = (plant.generation, plant.health_damage)
            else {
                warn!(
                    "Dropping coal plant {code}: missing {}",
                    match (plant.generation, plant.health_damage) {
                        (None, None) => "generation and health damage data",
                        (None, _) => "generation data",
                        _ => "health damage data",
                    }
                );
                return None;
            };

            let unit = CoalUnit {
                code: code.clone(),
                capacity: plant.capacity,
                generation,
                health_damage,
            };
            Some((code, unit))
        })
        .collect()
}
