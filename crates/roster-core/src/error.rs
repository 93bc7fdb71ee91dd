use thiserror::Error;

use crate::ports::StoreError;

#[derive(Debug, Error)]
pub enum RosterError {
    /// store の失敗はそのまま上に流す（リトライしない）
    #[error(transparent)]
    Store(#[from] StoreError),
}
