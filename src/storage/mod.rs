//! 테이블의 디스크 표현.
//!
//! ```text
//! <schema>/<table>/1.csv, 2.csv, ...   샤드 (헤더 + 데이터 행)
//! <schema>/<table>/<table>_pk_sequence 마지막으로 발급한 기본 키
//! <schema>/<table>/<table>_lock        존재하면 잠김
//! ```

pub mod csv;
pub mod lock;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::{fs, io};
use tracing::{debug, info, warn};

pub use csv::Row;
pub use lock::{LockProvider, MarkerFileLock};

const SHARD_EXT: &str = "csv";

/// 스키마 디렉터리 하나를 가리킵니다.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

/// 테이블 디렉터리와 그 안의 파일 이름 규칙.
#[derive(Debug, Clone)]
pub struct TableDir {
    pub name: Box<str>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub number: u32,
    pub path: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self, name: &str) -> TableDir {
        TableDir {
            name: name.into(),
            path: self.root.join(name),
        }
    }

    /// 선언된 모든 테이블의 디렉터리, 1번 샤드, 시퀀스 파일을 만듭니다.
    /// 이미 있는 파일은 건드리지 않으므로 여러 번 실행해도 안전합니다.
    pub async fn initialize(&self, structure: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        for (name, columns) in structure {
            let table = self.table(name);
            fs::create_dir_all(&table.path).await?;

            let first = table.shard_path(1);
            if !fs::try_exists(&first).await? {
                create_shard(&first, &table.header_for(columns)).await?;
                debug!(table = %name, "created first shard");
            }
            if !fs::try_exists(table.sequence_path()).await? {
                table.write_sequence(0).await?;
            }
        }
        info!(schema = %self.root.display(), tables = structure.len(), "schema initialized");
        Ok(())
    }
}

impl TableDir {
    pub fn sequence_path(&self) -> PathBuf {
        self.path.join(format!("{}_pk_sequence", self.name))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.join(format!("{}_lock", self.name))
    }

    pub fn shard_path(&self, number: u32) -> PathBuf {
        self.path.join(format!("{number}.{SHARD_EXT}"))
    }

    /// `[<table>_pk, col1, col2, ...]`
    pub fn header_for(&self, columns: &[String]) -> Row {
        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push(format!("{}_pk", self.name));
        header.extend(columns.iter().cloned());
        header
    }

    /// 샤드 파일을 번호 오름차순으로 나열합니다. 디렉터리가 없으면 빈 목록입니다.
    pub async fn shards(&self) -> io::Result<Vec<Shard>> {
        let mut entries = match fs::read_dir(&self.path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut shards = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            // 잠금/시퀀스 파일은 `_`를 포함하므로 여기서 걸러집니다.
            let Some(stem) = file_name.strip_suffix(".csv") else {
                continue;
            };
            if stem.contains('_') {
                continue;
            }
            match stem.parse::<u32>() {
                Ok(number) => shards.push(Shard {
                    number,
                    path: entry.path(),
                }),
                Err(_) => warn!(table = %self.name, file = file_name, "ignoring non-numeric shard"),
            }
        }
        shards.sort_by_key(|shard| shard.number);
        Ok(shards)
    }

    pub async fn next_shard_number(&self) -> io::Result<u32> {
        let Some(last) = self.shards().await?.last().map(|shard| shard.number) else {
            return Ok(1);
        };
        last.checked_add(1).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no shard number left after {last} for table '{}'", self.name),
            )
        })
    }

    /// 첫 번째 샤드의 헤더. 샤드가 없거나 읽을 수 없으면 빈 헤더입니다.
    pub async fn header(&self) -> Row {
        let Ok(shards) = self.shards().await else {
            return Row::new();
        };
        let Some(first) = shards.first() else {
            return Row::new();
        };
        match fs::read_to_string(&first.path).await {
            Ok(text) => csv::parse_header(&text),
            Err(_) => Row::new(),
        }
    }

    /// 모든 샤드의 데이터 행을 샤드 번호, 파일 순서대로 읽습니다.
    pub async fn rows(&self) -> Vec<Row> {
        let Ok(shards) = self.shards().await else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for shard in shards {
            rows.extend(read_rows(&shard.path).await);
        }
        rows
    }

    /// 파일이 없으면 0입니다.
    pub async fn read_sequence(&self) -> io::Result<u64> {
        let text = match fs::read_to_string(self.sequence_path()).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        text.trim().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("corrupted pk sequence for table '{}'", self.name),
            )
        })
    }

    pub async fn write_sequence(&self, value: u64) -> io::Result<()> {
        fs::write(self.sequence_path(), value.to_string()).await
    }
}

/// 읽을 수 없는 샤드는 빈 샤드로 취급합니다.
pub async fn read_rows(path: &Path) -> Vec<Row> {
    match fs::read_to_string(path).await {
        Ok(text) => csv::parse_rows(&text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unreadable shard treated as empty");
            Vec::new()
        }
    }
}

pub async fn row_count(path: &Path) -> usize {
    match fs::read_to_string(path).await {
        Ok(text) => csv::count_rows(&text),
        Err(_) => 0,
    }
}

/// 헤더만 있는 새 샤드를 만듭니다. 같은 이름의 파일은 덮어씁니다.
pub async fn create_shard(path: &Path, header: &[String]) -> io::Result<()> {
    fs::write(path, csv::format_row(header)).await
}

pub async fn append_row(path: &Path, row: &[String]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(csv::format_row(row).as_bytes()).await?;
    file.flush().await
}

/// 헤더와 남길 행으로 샤드를 통째로 다시 씁니다.
pub async fn rewrite_shard(path: &Path, header: &[String], rows: &[Row]) -> io::Result<()> {
    let mut out = csv::format_row(header);
    for row in rows {
        out.push_str(&csv::format_row(row));
    }
    fs::write(path, out).await
}
