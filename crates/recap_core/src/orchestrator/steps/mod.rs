//! The five pipeline steps: Identify, Acquire, Transcribe, Summarize,
//! Deliver.

mod acquire;
mod deliver;
mod identify;
mod summarize;
mod transcribe;

pub use acquire::{AcquireStep, AUDIO_POINTER_ARTIFACT};
pub use deliver::DeliverStep;
pub use identify::{IdentifyStep, INFO_ARTIFACT};
pub use summarize::SummarizeStep;
pub use transcribe::TranscribeStep;
