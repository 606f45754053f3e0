//! Prelude for the engine crate.

pub use crate::config::EngineConfig;
pub use crate::driver::TickDriver;
pub use crate::engine::{DialEngine, EmittedToken, EngineStatus, rotation_of};
pub use crate::error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use crate::sink::{EventSink, OutputSink, ReportSource};
pub use dialflow_physics::prelude::*;
pub use dialflow_report::prelude::*;
