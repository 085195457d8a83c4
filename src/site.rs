//! Candidate sites for renewable buildout.
use crate::id::define_id_type;
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear};
use indexmap::IndexMap;

define_id_type! {SiteID}

/// A candidate renewable site
#[derive(Debug, Clone, PartialEq)]
pub struct RenewableSite {
    /// Unique identifier for the site
    pub id: SiteID,
    /// The annual capacity factor of generation at this site
    pub annual_cf: Dimensionless,
    /// Capital cost of new capacity
    pub capital_cost: MoneyPerCapacity,
    /// Fixed operating cost of capacity
    pub fixed_operating_cost: MoneyPerCapacityPerYear,
    /// The maximum capacity which can be built here, if it differs from the model default
    pub max_capacity: Option<Capacity>,
}

/// A map of [`RenewableSite`]s, keyed by site ID
pub type RenewableSiteMap = IndexMap<SiteID, RenewableSite>;
