use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("image root does not exist: {}", .0.display())]
    ImageRootNotFound(PathBuf),

    #[error("image root is not a directory: {}", .0.display())]
    ImageRootNotDirectory(PathBuf),

    #[error("table not found: {}", .0.display())]
    TableNotFound(PathBuf),

    #[error("unsupported table format: {}", .0.display())]
    UnsupportedTable(PathBuf),

    #[error("sheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("workbook has no sheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),

    #[error("header row {header_row} is past the end of {} ({rows} rows)", .path.display())]
    HeaderRowOutOfRange {
        path: PathBuf,
        header_row: usize,
        rows: usize,
    },

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("row {row}: column '{column}' holds a corrupt value ({value})")]
    CorruptCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
