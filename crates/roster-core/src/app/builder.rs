//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 何も指定しなければ開発用の実装（InMemoryRecordStore, SystemClock）で組み立てる
//! - 起動時の seed は build() の中で実行する

use std::sync::Arc;

use crate::app::{RecordService, seed};
use crate::domain::NewRecord;
use crate::error::RosterError;
use crate::impls::InMemoryRecordStore;
use crate::ports::{Clock, RecordStore, SystemClock, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .seed(default_seed())
///     .build()
///     .await?;
/// let records = app.service.get_all().await?;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    store: Option<Arc<dyn RecordStore>>,
    clock: Option<Arc<dyn Clock>>,
    seeds: Option<Vec<NewRecord>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store を差し替える（未指定なら InMemoryRecordStore）
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Clock を差し替える（未指定なら SystemClock）
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// build() 時に store を空にしてこのリストを投入する
    pub fn seed(mut self, seeds: Vec<NewRecord>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// seed が設定されていれば、ここで store をリセットします。
    /// store の失敗はそのまま返します。
    pub async fn build(self) -> Result<App, RosterError> {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let store = self.store.unwrap_or_else(|| {
            Arc::new(InMemoryRecordStore::with_id_generator(Arc::new(
                UlidGenerator::new(clock.clone()),
            ))) as Arc<dyn RecordStore>
        });

        let service = RecordService::new(store, clock);
        if let Some(seeds) = self.seeds {
            seed(&service, seeds).await?;
        }
        Ok(App { service })
    }
}

/// App はアプリケーションのランタイム
#[derive(Clone)]
pub struct App {
    pub service: RecordService,
}
