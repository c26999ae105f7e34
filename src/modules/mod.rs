//! Stock modules usable in any pipeline.

pub mod blob_printer;
pub mod cycle_pump;

pub use blob_printer::BlobPrinter;
pub use cycle_pump::CyclePump;
