/// Number of cycles kept in each timing history
pub const STATS_LIMIT: usize = 100_000;
/// Module configuration file picked up from the working directory when none is given
pub const MODULE_CONFIGURATION: &str = "pipeline.toml";
/// Top-level table of a module configuration file holding substitutable constants
pub const VARIABLES_SECTION: &str = "VARIABLES";

/// Cadence parameter: run on every cycle whose 1-based index is a multiple of it
pub const EVERY: &str = "every";
/// Conditional parameter: keys that must all be present in the blob
pub const ONLY_IF: &str = "only_if";
/// Per-module timing parameter
pub const TIMEIT: &str = "timeit";
/// Projection parameter: keys the module receives instead of the full blob
pub const BLOB_KEYS: &str = "blob_keys";

/// Scheduling parameters, never reported by the unused-parameter audit.
///
/// `blob_keys` belongs here as well: the pipeline consumes it to build the
/// projected view, so a module never reads it itself.
pub const RESERVED_PARAMETERS: [&str; 4] = [EVERY, ONLY_IF, TIMEIT, BLOB_KEYS];
