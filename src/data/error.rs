use thiserror::Error;

/// Failure while turning an input file into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file format: {0} (expected csv, excel or tab-delimited)")]
    UnsupportedFormat(String),

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Column '{column}', row {row}: '{value}' is not a whole number")]
    TypeCoercion {
        column: String,
        /// 1-based data row (header excluded).
        row: usize,
        value: String,
    },

    #[error("The data is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Column '{0}' appears more than once after normalizing headers")]
    AmbiguousColumn(String),

    #[error("Failed to parse delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while applying a [`FilterSpec`](super::filter::FilterSpec).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("End season must be after start season ({start} > {end})")]
    InvalidRange { start: i32, end: i32 },
}
