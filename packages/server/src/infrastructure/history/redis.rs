//! Redis HistoryStore 実装
//!
//! HistoryStore の 3 操作を Redis のリストコマンドにそのまま対応させます。
//!
//! | HistoryStore | Redis    |
//! |--------------|----------|
//! | push_front   | `LPUSH`  |
//! | range        | `LRANGE` |
//! | trim         | `LTRIM`  |
//!
//! `range` の `stop = None` は `-1`（末尾まで）として送ります。

use async_trait::async_trait;
use redis::{AsyncCommands, ErrorKind, RedisError, aio::ConnectionManager};

use crate::domain::{HistoryStore, HistoryStoreError};

/// Redis のリストを使う HistoryStore 実装
///
/// `ConnectionManager` は切断時に自動で再接続します。
/// 接続中に失敗したコマンドは `HistoryStoreError::Unavailable` になります。
#[derive(Clone)]
pub struct RedisHistoryStore {
    conn: ConnectionManager,
}

impl RedisHistoryStore {
    /// `redis://host:port/db` 形式の URL に接続する
    ///
    /// # Errors
    ///
    /// URL が不正、またはサーバーに接続できない場合は `Unavailable` を返す
    pub async fn connect(url: &str) -> Result<Self, HistoryStoreError> {
        let client = redis::Client::open(url).map_err(to_store_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(to_store_error)?;

        tracing::info!("Connected to Redis history store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn push_front(&self, key: &str, value: String) -> Result<usize, HistoryStoreError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, usize>(key, value)
            .await
            .map_err(to_store_error)
    }

    async fn range(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<String>, HistoryStoreError> {
        let mut conn = self.conn.clone();
        conn.lrange::<_, Vec<String>>(key, to_index(start), to_stop_index(stop))
            .await
            .map_err(to_store_error)
    }

    async fn trim(&self, key: &str, start: usize, stop: usize) -> Result<(), HistoryStoreError> {
        let mut conn = self.conn.clone();
        conn.ltrim::<_, ()>(key, to_index(start), to_index(stop))
            .await
            .map_err(to_store_error)
    }
}

fn to_index(index: usize) -> isize {
    isize::try_from(index).unwrap_or(isize::MAX)
}

fn to_stop_index(stop: Option<usize>) -> isize {
    stop.map_or(-1, to_index)
}

fn to_store_error(e: RedisError) -> HistoryStoreError {
    match e.kind() {
        ErrorKind::TypeError => HistoryStoreError::Codec(e.to_string()),
        _ => HistoryStoreError::Unavailable(e.to_string()),
    }
}
