//! Domain model (IDs, records, lookup results).
//!
//! - ids: RecordId（ULID ベース）
//! - record: Record と狭い入力形（NewRecord, RecordUpdate）
//! - lookup: 見つからないことを表す Lookup

pub mod ids;
pub mod lookup;
pub mod record;

pub use ids::RecordId;
pub use lookup::Lookup;
pub use record::{NewRecord, Record, RecordField, RecordUpdate};
