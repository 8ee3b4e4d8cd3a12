pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod preview;
pub mod progress;
pub mod report;
pub mod storage;

pub use config::PfeConfig;
pub use controller::{Controller, ControllerEvent, Effect};
pub use error::{PfeError, Result};
pub use report::{LastReport, ReportRequest, ReportResult};
