mod classifier;
mod commands;
mod error;
mod types;

pub use classifier::{classify, classify_snapshot};
pub use commands::{
    DeltaOverrideEntry, FormState, GlobalSwapEntry, ModelSwapEntry, RunCommand, ValidationMode,
    ValueOverrideEntry, apply_defaults, extract_commands,
};
pub use error::{ClassifyError, FormError};
pub use types::{
    InputSeries, ModelCatalog, ModelRecord, ResultType, ResultsSnapshot, SeriesPoint, SourceType,
    TimeSeries,
};
