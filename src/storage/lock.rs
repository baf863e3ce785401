//! 테이블 단위 쓰기 잠금.
//!
//! 잠금은 재진입이 없는 불리언 하나입니다. 이미 잠겨 있으면 기다리지 않고
//! 바로 `false`를 돌려주며, 재시도는 호출자가 결정합니다.

use std::future::Future;

use tokio::io::AsyncWriteExt;
use tokio::{fs, io};
use tracing::debug;

use super::TableDir;

pub trait LockProvider {
    /// 잠금을 얻으면 `true`, 이미 잠겨 있으면 `false`.
    fn try_acquire(&self, table: &TableDir) -> impl Future<Output = io::Result<bool>>;

    fn release(&self, table: &TableDir) -> impl Future<Output = io::Result<()>>;
}

/// `<table>_lock` 파일이 있으면 잠긴 상태입니다. 내용은 의미가 없습니다.
///
/// 파일은 `create_new`로 만들기 때문에 확인과 생성이 한 번의 원자적 연산입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerFileLock;

impl LockProvider for MarkerFileLock {
    async fn try_acquire(&self, table: &TableDir) -> io::Result<bool> {
        let path = table.lock_path();
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e),
        };
        if let Err(e) = file.write_all(b"locked").await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }
        debug!(table = %table.name, "lock acquired");
        Ok(true)
    }

    async fn release(&self, table: &TableDir) -> io::Result<()> {
        match fs::remove_file(table.lock_path()).await {
            Ok(()) => {
                debug!(table = %table.name, "lock released");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
