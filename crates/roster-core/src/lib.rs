//! roster-core
//!
//! Core building blocks for the roster record service.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RecordId, Record, NewRecord, RecordUpdate, Lookup）
//! - **ports**: 抽象化レイヤー（RecordStore, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（RecordService, seed, AppBuilder）
//! - **impls**: 実装（InMemoryRecordStore など開発用）
//! - **error**: エラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use error::RosterError;
