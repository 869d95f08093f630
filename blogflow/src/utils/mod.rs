//! Small shared utilities.

mod clock;
mod ids;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{FixedIds, IdSource, RandomIds};
