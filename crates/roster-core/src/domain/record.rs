//! Record model: 永続化される形と、そこへ入ってくる入力の形。
//!
//! 入力の形は 2 種類あります:
//! - `Record` そのもの（id や監査フィールド付きで届くこともある）
//! - `NewRecord` / `RecordUpdate`（name, code, description だけの狭い形）
//!
//! 狭い形は `From` による明示的な変換で `Record` になります。
//! 監査フィールド（created_at, update_history）を決めるのは常に service 側で、
//! 入力に入っていた値は使いません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;

/// The persisted entity.
///
/// JSON では camelCase（`createdAt`, `updateHistory`）。
/// テキスト項目が欠けていれば空文字列、`updateHistory` が欠けていれば空として読みます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// store が初回 save で採番する。以後不変。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default)]
    pub name: String,

    /// Short categorical label (e.g. a band name).
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub description: String,

    /// 初回永続化の時刻。一度だけセットされる。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// 更新のたびに 1 件ずつ追記される（append-only）。
    #[serde(default)]
    pub update_history: Vec<DateTime<Utc>>,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            code: code.into(),
            description: description.into(),
            created_at: None,
            update_history: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// 新規作成としてスタンプする。呼び出し側が持ってきた監査フィールドは捨てる。
    pub fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.update_history = Vec::new();
    }

    /// 更新としてスタンプする。
    ///
    /// - `created_at` は `existing` からそのまま引き継ぐ
    /// - `update_history` は `existing` の履歴に `now` を 1 件足したもの
    pub fn stamp_updated(&mut self, existing: &Record, now: DateTime<Utc>) {
        let mut history = existing.update_history.clone();
        history.push(now);
        self.created_at = existing.created_at;
        self.update_history = history;
    }

    /// Value of a searchable field.
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::Code => &self.code,
        }
    }
}

/// Narrow create input: no id, no timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl NewRecord {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            description: description.into(),
        }
    }
}

impl From<NewRecord> for Record {
    fn from(request: NewRecord) -> Self {
        Record::new(request.name, request.code, request.description)
    }
}

/// Narrow update input: target id plus the fields that get overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl RecordUpdate {
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            description: description.into(),
        }
    }
}

impl From<RecordUpdate> for Record {
    fn from(request: RecordUpdate) -> Self {
        Record::new(request.name, request.code, request.description).with_id(request.id)
    }
}

/// Fields the store can be queried by (exact match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Code,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordField::Name => f.write_str("name"),
            RecordField::Code => f.write_str("code"),
        }
    }
}
