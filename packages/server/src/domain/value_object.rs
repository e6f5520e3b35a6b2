//! Value objects for the chat relay domain.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hiroba_shared::time::{format_iso8601, parse_iso8601};

use super::error::ValueObjectError;

/// Room identifier
///
/// Opaque string chosen by clients. The only rule is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Create a new RoomId
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::RoomIdEmpty` if the value is empty.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random session id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server receipt time of a chat message
///
/// Serialized as ISO 8601 in UTC with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn to_iso8601(&self) -> String {
        format_iso8601(&self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_iso8601(&value)
            .map(Self)
            .map_err(|_| ValueObjectError::TimestampInvalid(value))
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.to_iso8601()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_room_id_accepts_any_non_empty_string() {
        // テスト項目: 空でない文字列なら任意の値で RoomId を作成できる
        // given (前提条件):
        let values = ["X", "place-42", "日本語の部屋", " "];

        // when (操作):
        let results: Vec<_> = values
            .iter()
            .map(|v| RoomId::new(v.to_string()))
            .collect();

        // then (期待する結果):
        assert!(results.iter().all(Result::is_ok));
    }

    #[test]
    fn test_room_id_rejects_empty_string() {
        // テスト項目: 空文字列の RoomId はエラーになる
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = RoomId::try_from(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::RoomIdEmpty));
    }

    #[test]
    fn test_session_ids_are_unique() {
        // テスト項目: 生成される SessionId は毎回異なる
        // given (前提条件):

        // when (操作):
        let a = SessionId::generate();
        let b = SessionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_timestamp_serializes_as_iso8601() {
        // テスト項目: Timestamp が ISO 8601 文字列としてシリアライズされる
        // given (前提条件):
        let timestamp = Timestamp::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap());

        // when (操作):
        let json = serde_json::to_string(&timestamp).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"2026-10-16T09:30:00.000Z\"");
    }

    #[test]
    fn test_timestamp_rejects_invalid_string() {
        // テスト項目: 不正な文字列からの Timestamp 変換はエラーになる
        // given (前提条件):
        let json = "\"not a time\"";

        // when (操作):
        let result = serde_json::from_str::<Timestamp>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
