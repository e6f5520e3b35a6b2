//! InMemory HistoryStore 実装
//!
//! ドメイン層が定義する HistoryStore trait の具体的な実装。
//! キーごとの `VecDeque` を newest-first のリストとして使用します。
//!
//! プロセス終了とともに履歴は失われます。永続化が必要な場合は
//! `RedisHistoryStore` を使用してください。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HistoryStore, HistoryStoreError};

/// インメモリ HistoryStore 実装
#[derive(Default)]
pub struct InMemoryHistoryStore {
    /// Key: history key, Value: newest-first list of records
    lists: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryHistoryStore {
    /// 新しい InMemoryHistoryStore を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// キーに格納されているレコード数を取得
    #[cfg(test)]
    pub async fn len(&self, key: &str) -> usize {
        let lists = self.lists.lock().await;
        lists.get(key).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn push_front(&self, key: &str, value: String) -> Result<usize, HistoryStoreError> {
        let mut lists = self.lists.lock().await;
        let list = lists.entry(key.to_string()).or_default();
        list.push_front(value);
        Ok(list.len())
    }

    async fn range(
        &self,
        key: &str,
        start: usize,
        stop: Option<usize>,
    ) -> Result<Vec<String>, HistoryStoreError> {
        let lists = self.lists.lock().await;
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };

        let end = stop.map_or(list.len(), |stop| stop.saturating_add(1).min(list.len()));
        if start >= end {
            return Ok(Vec::new());
        }

        Ok(list.range(start..end).cloned().collect())
    }

    async fn trim(&self, key: &str, start: usize, stop: usize) -> Result<(), HistoryStoreError> {
        let mut lists = self.lists.lock().await;
        let Some(list) = lists.get_mut(key) else {
            return Ok(());
        };

        let end = stop.saturating_add(1).min(list.len());
        if start >= end {
            lists.remove(key);
            return Ok(());
        }

        list.truncate(end);
        list.drain(..start);
        Ok(())
    }
}
