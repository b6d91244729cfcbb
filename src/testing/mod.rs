pub mod fixtures;
pub mod stubs;

pub use stubs::{CountingModel, RecordingSink};
