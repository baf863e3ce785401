/*
지원하는 SQL

    SELECT users.name, orders.item FROM users, orders WHERE users.users_pk = orders.user_id
    INSERT INTO users VALUES ('Alice', '30')
    DELETE FROM users WHERE users.name = 'Alice' OR users.age = '30'

- 모든 컬럼은 `테이블.컬럼` 형태로 적습니다.
- 조건은 등호(=)만 지원하며, AND/OR는 왼쪽부터 차례로 묶입니다.
- 기본 키 `<table>_pk`는 INSERT 시 자동으로 발급됩니다.
*/

pub mod error;
pub mod filter;
pub mod join;

use std::future::Future;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Schema;
use crate::query::{ColumnRef, Delete, Insert, Parser, Select, Stmt};
use crate::storage::{self, LockProvider, MarkerFileLock, Row, Storage, TableDir};

pub use error::{ExecError, Result};
pub use filter::ConditionMode;
use filter::Binding;
use join::{Join, Relation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Inserted,
    Deleted(usize),
    Error(String),
}

pub struct Executor<L: LockProvider = MarkerFileLock> {
    schema: Schema,
    storage: Storage,
    lock: L,
    mode: ConditionMode,
}

impl Executor {
    /// `<data_dir>/<schema name>` 아래의 테이블을 다룹니다.
    pub fn new(schema: Schema, data_dir: &Path) -> Self {
        let storage = Storage::new(data_dir.join(&schema.name));
        Self {
            schema,
            storage,
            lock: MarkerFileLock,
            mode: ConditionMode::default(),
        }
    }
}

impl<L: LockProvider> Executor<L> {
    pub fn with_lock<M: LockProvider>(self, lock: M) -> Executor<M> {
        Executor {
            schema: self.schema,
            storage: self.storage,
            lock,
            mode: self.mode,
        }
    }

    pub fn with_mode(mut self, mode: ConditionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub async fn initialize(&self) -> std::io::Result<()> {
        self.storage.initialize(&self.schema.structure).await
    }

    pub async fn run(&self, src: &str) -> QueryResult {
        let result = match Parser::parse(src) {
            Some(Stmt::Select(query)) => return QueryResult::Rows(self.select(&query).await),
            Some(Stmt::Insert(query)) => self.insert(&query).await.map(|()| QueryResult::Inserted),
            Some(Stmt::Delete(query)) => self.delete(&query).await.map(QueryResult::Deleted),
            None => return QueryResult::Error("Unknown query type.".to_string()),
        };
        result.unwrap_or_else(|e| QueryResult::Error(e.to_string()))
    }

    /// 잠금을 쓰지 않으므로 다른 쓰기 작업 도중의 상태를 볼 수 있습니다.
    pub async fn select(&self, query: &Select) -> Vec<Row> {
        let mut relations = Vec::with_capacity(query.tables.len());
        for name in &query.tables {
            let table = self.storage.table(name);
            relations.push(Relation {
                name: name.clone(),
                header: table.header().await,
                rows: table.rows().await,
            });
        }
        let rows: Vec<Row> = Join::new(&relations)
            .filter(|bindings| filter::evaluate(self.mode, &query.filters, bindings))
            .map(|bindings| project(&query.columns, &bindings))
            .collect();
        debug!(tables = query.tables.len(), rows = rows.len(), "select finished");
        rows
    }

    pub async fn insert(&self, query: &Insert) -> Result<()> {
        let table = self.storage.table(&query.table);
        self.locked(&table, self.insert_locked(&table, query)).await
    }

    /// 지운 행 수를 돌려줍니다. 헤더를 읽을 수 없는 테이블은 지울 것이 없는 것으로 봅니다.
    pub async fn delete(&self, query: &Delete) -> Result<usize> {
        let table = self.storage.table(&query.table);
        self.locked(&table, self.delete_locked(&table, query)).await
    }

    // `body`는 잠금을 얻은 뒤에야 poll 됩니다. 결과와 상관없이 잠금은 풀립니다.
    async fn locked<T>(&self, table: &TableDir, body: impl Future<Output = Result<T>>) -> Result<T> {
        // 이미 잠긴 경우만 TableBusy입니다. 테이블 디렉터리가 없는 등
        // 잠금 파일을 만들 수 없는 경우는 일부러 Io 오류로 올려 보냅니다.
        if !self.lock.try_acquire(table).await? {
            warn!(table = %table.name, "table is busy");
            return Err(ExecError::TableBusy {
                table: table.name.to_string(),
            });
        }
        let result = body.await;
        // 본문이 이미 기록을 마쳤으므로 해제 실패로 결과를 뒤집지 않습니다.
        if let Err(e) = self.lock.release(table).await {
            warn!(table = %table.name, error = %e, "failed to release lock");
        }
        result
    }

    async fn insert_locked(&self, table: &TableDir, query: &Insert) -> Result<()> {
        let pk = table.read_sequence().await? + 1;
        let header = table.header().await;
        if header.is_empty() {
            return Err(ExecError::Structural {
                table: table.name.to_string(),
            });
        }
        let expected = header.len() - 1;
        if query.values.len() != expected {
            return Err(ExecError::ColumnCount {
                table: table.name.to_string(),
                expected,
                found: query.values.len(),
            });
        }

        let shards = table.shards().await?;
        let target = match shards.last() {
            None => {
                let path = table.shard_path(1);
                storage::create_shard(&path, &header).await?;
                path
            }
            Some(last) => {
                if storage::row_count(&last.path).await < self.schema.tuples_limit {
                    last.path.clone()
                } else {
                    let number = table.next_shard_number().await?;
                    let path = table.shard_path(number);
                    storage::create_shard(&path, &header).await?;
                    debug!(table = %table.name, shard = number, "opened new shard");
                    path
                }
            }
        };

        let mut row = Vec::with_capacity(header.len());
        row.push(pk.to_string());
        row.extend(query.values.iter().map(ToString::to_string));
        storage::append_row(&target, &row).await?;
        table.write_sequence(pk).await?;
        info!(table = %table.name, pk, "row inserted");
        Ok(())
    }

    async fn delete_locked(&self, table: &TableDir, query: &Delete) -> Result<usize> {
        let header = table.header().await;
        if header.is_empty() {
            debug!(table = %table.name, "no header, nothing to delete");
            return Ok(0);
        }
        let mut removed = 0;
        for shard in table.shards().await? {
            let rows = storage::read_rows(&shard.path).await;
            let before = rows.len();
            let kept: Vec<Row> = rows
                .into_iter()
                .filter(|row| {
                    let bindings = [Binding {
                        table: &table.name,
                        header: &header,
                        row,
                    }];
                    !filter::evaluate(self.mode, &query.filters, &bindings)
                })
                .collect();
            removed += before - kept.len();
            storage::rewrite_shard(&shard.path, &header, &kept).await?;
        }
        info!(table = %table.name, removed, "rows deleted");
        Ok(removed)
    }
}

/// 요청 순서대로 값을 뽑습니다. 찾을 수 없는 컬럼은 빈 문자열입니다.
fn project(columns: &[ColumnRef], bindings: &[Binding]) -> Row {
    columns
        .iter()
        .map(|column| filter::resolve(bindings, column).to_string())
        .collect()
}
