use thiserror::Error;

/// Failures while classifying a series key against the naming grammars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The key matched a grammar's marker but carries fewer tokens than
    /// the grammar destructures.
    #[error(
        "series key {key:?} matches the {grammar} grammar but has {found} tokens (expected at least {expected})"
    )]
    MalformedKey {
        key: String,
        grammar: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failures while extracting a command list from a submitted form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{list} entry {index} is missing required field {field:?}")]
    MissingField {
        list: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{list} entry {index} field {field:?} is not a YYYY-MM-DD date: {raw:?}")]
    InvalidDate {
        list: &'static str,
        index: usize,
        field: &'static str,
        raw: String,
    },

    #[error("{field:?} must be a positive number of days")]
    NonPositiveDays { field: &'static str },

    #[error("{field:?} references unknown model {id:?}")]
    UnknownModel { field: &'static str, id: String },

    #[error("{field:?} references unknown input series {id:?}")]
    UnknownInput { field: &'static str, id: String },
}
