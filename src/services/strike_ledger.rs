//! Append-only strike ledger.
//!
//! The cumulative total is never stored: it is re-summed from every record of
//! the target after each append so it cannot drift from the ledger.

use std::sync::Arc;

use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{NewStrikeRecord, StrikeRecord};

#[derive(Debug, Clone)]
pub struct StrikeEntry {
    pub record: StrikeRecord,
    pub new_total: i64,
}

pub struct StrikeLedger {
    store: Arc<dyn ModerationStore>,
}

impl StrikeLedger {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, strike: NewStrikeRecord) -> Result<StrikeEntry> {
        let record = self.store.insert_strike(&strike).await?;
        let history = self.store.list_strikes(strike.user_id).await?;
        let new_total = total_weight(&history);

        tracing::info!(
            strike_id = %record.id,
            user_id = %strike.user_id,
            report_id = %strike.report_id,
            severity = %strike.severity,
            strike_weight = strike.strike_weight(),
            new_total,
            "Strike recorded"
        );

        Ok(StrikeEntry { record, new_total })
    }
}

pub fn total_weight(records: &[StrikeRecord]) -> i64 {
    records.iter().map(|r| i64::from(r.strike_weight)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(weight: i32) -> StrikeRecord {
        StrikeRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            report_id: Uuid::new_v4(),
            report_type: "user".to_string(),
            severity: "low".to_string(),
            strike_weight: weight,
            action: "warn".to_string(),
            admin_id: Uuid::new_v4(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_weight() {
        assert_eq!(total_weight(&[]), 0);
        assert_eq!(total_weight(&[record(1), record(3), record(2)]), 6);
    }
}
