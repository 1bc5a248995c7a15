/*!
Core rules of the election administration tracking hub.

The hub tracks, for every state, the elections that were held, the officials
that were contacted about their results and the volunteers working on them.
This crate holds the parts of the hub that do not depend on a database or a
web framework:

- identity keys for elections and contact logs ([`Election::elec_key`],
  [`Election::special_key`], [`Log::log_key`]),
- validation of the fields of an election ([`validate`]),
- per-state status rollups ([`results_status`], [`status_json`]),
- the one-off collapse of duplicate primary records ([`collapse_elections`]).

Records are read and written through the [`HubReader`] and [`HubWriter`]
traits. [`MemoryStore`] implements them in memory.
*/

mod config;
mod keys;
mod model;

pub mod builder;
pub mod collapse;
pub mod status;
pub mod store;
pub mod validation;

pub use crate::collapse::{
    apply_collapse, collapse_elections, plan_collapse, CollapseError, CollapsePlan, CollapseReport,
};
pub use crate::config::*;
pub use crate::keys::ElecKey;
pub use crate::model::*;
pub use crate::status::{results_status, status_entry, status_json, ResultsStatus, StatusEntry};
pub use crate::store::{ElectionFilter, HubReader, HubWriter, MemoryStore, StoreError};
pub use crate::validation::{validate, violations, ValidationError};
