//! Observability: tracing setup, the stage logger registry and timing.

mod logging;
mod timing;

pub use logging::{init_tracing, LoggerRegistry, StageLogger};
pub use timing::SpanTimer;
