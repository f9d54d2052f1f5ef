use crate::{
    models::{NewPrompt, PaymentRecord, RecordOutcome},
    services::store::{PaymentLedger, PromptStore},
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-process store used in development when Redis is unreachable, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    paid: RwLock<HashMap<String, HashSet<String>>>,
    records: RwLock<HashMap<(String, String), PaymentRecord>>,
    prompts: RwLock<HashMap<String, NewPrompt>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn prompt(&self, prompt_id: &str) -> Option<NewPrompt> {
        self.prompts.read().await.get(prompt_id).cloned()
    }

    /// Detail record written by the first payment of `user_fid`, for inspection.
    pub async fn payment_record(&self, prompt_id: &str, user_fid: &str) -> Option<PaymentRecord> {
        self.records
            .read()
            .await
            .get(&(prompt_id.to_string(), user_fid.to_string()))
            .cloned()
    }
}

#[async_trait]
impl PaymentLedger for MemoryStore {
    async fn has_paid(&self, prompt_id: &str, user_fid: &str) -> Result<bool> {
        Ok(self
            .paid
            .read()
            .await
            .get(prompt_id)
            .is_some_and(|set| set.contains(user_fid)))
    }

    async fn total_paid(&self, prompt_id: &str) -> Result<u64> {
        Ok(self
            .paid
            .read()
            .await
            .get(prompt_id)
            .map_or(0, |set| set.len() as u64))
    }

    async fn record_payment(
        &self,
        prompt_id: &str,
        user_fid: &str,
        record: &PaymentRecord,
    ) -> Result<RecordOutcome> {
        // Hold the set lock across the detail write, mirroring the Redis script.
        let mut paid = self.paid.write().await;
        let set = paid.entry(prompt_id.to_string()).or_default();
        let newly_recorded = set.insert(user_fid.to_string());

        if newly_recorded {
            self.records
                .write()
                .await
                .insert((prompt_id.to_string(), user_fid.to_string()), record.clone());
        }

        Ok(RecordOutcome {
            newly_recorded,
            total_paid: set.len() as u64,
        })
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<()> {
        self.prompts
            .write()
            .await
            .insert(prompt.id.clone(), prompt.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tx: &str) -> PaymentRecord {
        PaymentRecord {
            user_address: "0xabc".to_string(),
            tx_hash: tx.to_string(),
            timestamp: 1,
        }
    }

    #[tokio::test]
    async fn second_payment_is_not_rewritten() {
        let store = MemoryStore::new();

        let first = store.record_payment("1", "10", &record("0x01")).await.unwrap();
        assert_eq!(first, RecordOutcome { newly_recorded: true, total_paid: 1 });

        let second = store.record_payment("1", "10", &record("0x02")).await.unwrap();
        assert_eq!(second, RecordOutcome { newly_recorded: false, total_paid: 1 });

        let stored = store.payment_record("1", "10").await.unwrap();
        assert_eq!(stored.tx_hash, "0x01");
    }

    #[tokio::test]
    async fn prompts_are_tracked_separately() {
        let store = MemoryStore::new();
        store.record_payment("1", "10", &record("0x01")).await.unwrap();
        store.record_payment("2", "10", &record("0x02")).await.unwrap();
        store.record_payment("2", "11", &record("0x03")).await.unwrap();

        assert_eq!(store.total_paid("1").await.unwrap(), 1);
        assert_eq!(store.total_paid("2").await.unwrap(), 2);
        assert!(store.has_paid("2", "11").await.unwrap());
        assert!(!store.has_paid("1", "11").await.unwrap());
        assert_eq!(store.total_paid("3").await.unwrap(), 0);
    }
}
