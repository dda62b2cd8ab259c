//! Reconciliation engine for the dictionary search page.
//!
//! A pass brings the page in line with the current [`settings::Preferences`]: the query field's
//! submit mode, the preselected dictionaries, the order of result containers and the
//! presentation of their articles. Passes are idempotent, so a page can be reconciled as often
//! as the host mutates it.

pub mod config;
pub mod contract;
pub mod input_mode;
pub mod order;
pub mod pipeline;
pub mod preselect;
pub mod present;
pub mod scheduler;
pub mod styles;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::pipeline::{Engine, Handled, RunReport};
pub use crate::preselect::Preselector;
pub use crate::present::Presenter;
pub use crate::scheduler::{Request, Scheduler, Scope};
