//! Reconstructs agent rollout logs into playback steps.

pub mod event;
pub mod extract;
pub mod ingest;
pub mod reasoning;
pub mod transform;

pub use event::RawEvent;
pub use ingest::{ingest, ingest_file, InputFormat};
pub use reasoning::synthesize_reasoning;
pub use transform::{transform, StepReducer};
