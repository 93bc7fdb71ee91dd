//! Seed - 起動時のデモデータ投入
//!
//! 起動のたびに store を空にして、決まったレコードを入れ直します（破壊的）。
//! 投入するリストは引数で受け取るので、テストや別のデモ用に差し替えられます。

use tracing::info;

use crate::app::RecordService;
use crate::domain::{NewRecord, Record};
use crate::error::RosterError;

/// The demo dataset the server starts with.
pub fn default_seed() -> Vec<NewRecord> {
    vec![
        NewRecord::new("Freddie Mercury", "Queen", "vocal, piano"),
        NewRecord::new("Paul McCartney", "Beatles", "bass, vocal"),
        NewRecord::new("Mick Jagger", "Rolling Stones", "vocal"),
    ]
}

/// Clear the store and insert `seeds` through the create path, so each one
/// gets a fresh `created_at` and an empty history.
pub async fn seed(
    service: &RecordService,
    seeds: Vec<NewRecord>,
) -> Result<Vec<Record>, RosterError> {
    service.store().delete_all().await?;

    let mut inserted = Vec::with_capacity(seeds.len());
    for request in seeds {
        inserted.push(service.create_from(request).await?);
    }
    info!(count = inserted.len(), "seeded record store");
    Ok(inserted)
}
