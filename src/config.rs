//! 스키마 설명 파일 (`schema.json`).
//!
//! ```json
//! {
//!     "name": "shop",
//!     "tuples_limit": 1000,
//!     "structure": {
//!         "users": ["name", "age"],
//!         "orders": ["user_id", "item"]
//!     }
//! }
//! ```
//!
//! 기본 키 컬럼(`<table>_pk`)은 적지 않습니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tuples_limit must be at least 1, found {0}")]
    InvalidLimit(usize),
}

/// 시작할 때 한 번 읽고 이후로는 바뀌지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Schema {
    pub name: String,
    /// 샤드 하나에 들어가는 최대 데이터 행 수
    pub tuples_limit: usize,
    pub structure: BTreeMap<String, Vec<String>>,
}

impl Schema {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let schema: Schema = serde_json::from_str(text)?;
        if schema.tuples_limit == 0 {
            return Err(ConfigError::InvalidLimit(schema.tuples_limit));
        }
        Ok(schema)
    }

    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.structure.get(table).map(Vec::as_slice)
    }
}
