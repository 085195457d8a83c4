//! Code for handling IDs
use anyhow::{Result, ensure};
use indexmap::IndexSet;

/// A trait alias for ID types
pub trait IDLike:
    Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}
impl<T> IDLike for T where
    T: Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            serde::Deserialize,
            Debug,
            serde::Serialize,
        )]
        /// An ID type (e.g. `PlantCode`, `SiteID`, etc.)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
define_id_type!(GenericID);

/// Collect IDs into an ordered set, checking that there are no duplicates.
///
/// # Arguments
///
/// * `ids` - The IDs, in the order in which they should appear in the set
/// * `kind` - What the IDs refer to, used in the error message
pub fn collect_unique_ids<ID, I>(ids: I, kind: &str) -> Result<IndexSet<ID>>
where
    ID: IDLike,
    I: IntoIterator<Item = ID>,
{
    let mut set = IndexSet::new();
    for id in ids {
        let description = id.to_string();
        ensure!(set.insert(id), "Duplicate {kind} ID: {description}");
    }

    Ok(set)
}
