//! HistoryStore の実装
//!
//! - `inmemory`: プロセス内のリストストア（デフォルト）
//! - `redis`: Redis のリスト

pub mod inmemory;
pub mod redis;

pub use inmemory::InMemoryHistoryStore;
pub use self::redis::RedisHistoryStore;
