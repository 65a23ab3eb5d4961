//! Sales domain module.
//!
//! Sales records are written elsewhere; this crate only models what the alert
//! evaluator needs from them: the trailing recency window and the sales
//! velocity used to estimate days until stockout.

pub mod record;
pub mod velocity;

pub use record::{SalesRecord, SalesWindow};
pub use velocity::days_until_stockout;
