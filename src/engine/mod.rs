pub mod interrupt;
pub mod pipeline;
pub mod schedule;
pub mod stage;
pub mod statistics;

pub use interrupt::{InterruptAction, InterruptHandle};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use schedule::Schedule;
pub use stage::{Stage, StageKind};
