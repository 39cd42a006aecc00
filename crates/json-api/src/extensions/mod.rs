//! Extension traits

mod actor;
mod depot;
mod result;

pub(crate) use actor::ActorDepotExt as _;
pub(crate) use depot::DepotExt as _;
pub(crate) use result::ResultExt as _;
