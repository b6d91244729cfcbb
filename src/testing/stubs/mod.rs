pub mod counting_model;
pub mod recording_sink;

pub use counting_model::CountingModel;
pub use recording_sink::RecordingSink;
