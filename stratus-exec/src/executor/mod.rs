mod engine;
pub mod events;
mod result;

pub use engine::Engine;
pub use events::{Event, EventSink, NoOpEventSink, Operation, StdoutEventSink};
pub use result::{ExecutionError, ExecutionReport};
