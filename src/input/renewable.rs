//! Code for reading candidate renewable sites from a CSV file.
use super::{deserialise_proportion, input_err_msg, read_csv};
use crate::id::collect_unique_ids;
use crate::site::{RenewableSite, RenewableSiteMap, SiteID};
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const RENEWABLE_SITES_FILE_NAME: &str = "renewable_sites.csv";

#[derive(Deserialize, PartialEq, Debug)]
struct RenewableSiteRaw {
    site_id: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    annual_cf: Dimensionless,
    capital_cost: MoneyPerCapacity,
    fixed_operating_cost: MoneyPerCapacityPerYear,
    #[serde(default)]
    max_capacity: Option<Capacity>,
}

/// Read candidate renewable sites along with their annual capacity factors.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The sites, in file order, keyed by ID
pub fn get_annual_cf(model_dir: &Path) -> Result<RenewableSiteMap> {
    let file_path = model_dir.join(RENEWABLE_SITES_FILE_NAME);
    let sites_csv = read_csv(&file_path)?;
    read_sites_from_iter(sites_csv).with_context(|| input_err_msg(&file_path))
}

fn read_sites_from_iter<I>(iter: I) -> Result<RenewableSiteMap>
where
    I: Iterator<Item = RenewableSiteRaw>,
{
    let sites: Vec<_> = iter
        .map(|site| -> Result<_> {
            ensure!(
                site.capital_cost.is_finite() && site.capital_cost >= MoneyPerCapacity(0.0),
                "Capital cost for site {} must be a finite, non-negative number",
                site.site_id
            );
            ensure!(
                site.fixed_operating_cost.is_finite()
                    && site.fixed_operating_cost >= MoneyPerCapacityPerYear(0.0),
                "Fixed operating cost for site {} must be a finite, non-negative number",
                site.site_id
            );
            if let Some(max_capacity) = site.max_capacity {
                ensure!(
                    max_capacity.is_finite() && max_capacity >= Capacity(0.0),
                    "Maximum capacity for site {} must be a finite, non-negative number",
                    site.site_id
                );
            }

            Ok(RenewableSite {
                id: site.site_id.into(),
                annual_cf: site.annual_cf,
                capital_cost: site.capital_cost,
                fixed_operating_cost: site.fixed_operating_cost,
                max_capacity: site.max_capacity,
            })
        })
        .collect::<Result<_>>()?;

    collect_unique_ids::<SiteID, _>(sites.iter().map(|site| site.id.clone()), "site")?;

    Ok(sites
        .into_iter()
        .map(|site| (site.id.clone(), site))
        .collect())
}
