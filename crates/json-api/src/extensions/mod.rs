//! Extension traits for salvo's `Depot` and handler results.

mod depot;
mod result;

pub(crate) use depot::DepotExt as _;
pub(crate) use result::ResultExt as _;
