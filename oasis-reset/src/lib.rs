pub mod orchestrator;

pub use orchestrator::{resolve_bookings, ResetError, ResetOrchestrator, ResetPhase, ResetReport};
