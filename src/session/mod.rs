pub mod controller;
pub mod state;

pub use controller::{MonitorController, MonitorSnapshot};
pub use state::{MonitorStatus, SessionPhase, SessionState};
