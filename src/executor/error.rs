use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    /// 다른 쓰기 작업이 테이블 잠금을 쥐고 있습니다.
    #[error("Table {table} is locked")]
    TableBusy { table: String },

    #[error("Cannot read table structure of {table}")]
    Structural { table: String },

    #[error("Column count mismatch for {table}: expected {expected}, found {found}")]
    ColumnCount {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
