pub mod cancel;
pub mod orchestrator;
pub mod pacing;
pub mod types;

pub use cancel::{CancelToken, StopHandle};
pub use orchestrator::{ScanOrchestrator, ScanSettings};
pub use pacing::{Pacer, PacingPolicy};
pub use types::{ScanReport, ScanResult, ScanSummary};
