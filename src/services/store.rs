use crate::models::{NewPrompt, PaymentRecord, RecordOutcome};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{AsyncCommands, IntoConnectionInfo};

const PROMPTS_BY_CREATED: &str = "prompts:by_created";

// SADD and the detail HSET run as one script so a user can only ever
// produce one detail record per prompt.
const RECORD_PAYMENT_SCRIPT: &str = r#"
local added = redis.call('SADD', KEYS[1], ARGV[1])
if added == 1 then
  redis.call('HSET', KEYS[2], 'userAddress', ARGV[2], 'txHash', ARGV[3], 'timestamp', ARGV[4])
end
return {added, redis.call('SCARD', KEYS[1])}
"#;

pub fn payments_key(prompt_id: &str) -> String {
    format!("prompt:{}:payments", prompt_id)
}

pub fn payment_detail_key(prompt_id: &str, user_fid: &str) -> String {
    format!("prompt:{}:payment:{}", prompt_id, user_fid)
}

pub fn prompt_key(prompt_id: &str) -> String {
    format!("prompt:{}", prompt_id)
}

/// Per-prompt paid-set plus payment detail records.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn has_paid(&self, prompt_id: &str, user_fid: &str) -> Result<bool>;

    async fn total_paid(&self, prompt_id: &str) -> Result<u64>;

    /// Adds `user_fid` to the paid-set and writes `record`, but only if the
    /// user was not already a member.
    async fn record_payment(
        &self,
        prompt_id: &str,
        user_fid: &str,
        record: &PaymentRecord,
    ) -> Result<RecordOutcome>;

    async fn ping(&self) -> bool;
}

#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<()>;
}

pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
    record_script: redis::Script,
}

impl RedisStore {
    pub async fn connect(url: &str, token: Option<&str>) -> Result<Self> {
        let mut info = url
            .into_connection_info()
            .context("Invalid key-value store URL")?;
        if let Some(token) = token {
            info.redis.password = Some(token.to_string());
        }

        let client = redis::Client::open(info)?;
        let conn = client
            .get_connection_manager()
            .await
            .context("Key-value store connection failed")?;

        tracing::info!("Redis connected successfully");

        Ok(Self {
            conn,
            record_script: redis::Script::new(RECORD_PAYMENT_SCRIPT),
        })
    }
}

#[async_trait]
impl PaymentLedger for RedisStore {
    async fn has_paid(&self, prompt_id: &str, user_fid: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let member: bool = conn.sismember(payments_key(prompt_id), user_fid).await?;
        Ok(member)
    }

    async fn total_paid(&self, prompt_id: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let total: u64 = conn.scard(payments_key(prompt_id)).await?;
        Ok(total)
    }

    async fn record_payment(
        &self,
        prompt_id: &str,
        user_fid: &str,
        record: &PaymentRecord,
    ) -> Result<RecordOutcome> {
        let mut conn = self.conn.clone();
        let (added, total_paid): (i64, u64) = self
            .record_script
            .key(payments_key(prompt_id))
            .key(payment_detail_key(prompt_id, user_fid))
            .arg(user_fid)
            .arg(&record.user_address)
            .arg(&record.tx_hash)
            .arg(record.timestamp)
            .invoke_async(&mut conn)
            .await?;

        tracing::debug!(
            "Payment script for prompt {} fid {}: added={} total={}",
            prompt_id,
            user_fid,
            added,
            total_paid
        );

        Ok(RecordOutcome {
            newly_recorded: added == 1,
            total_paid,
        })
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}

#[async_trait]
impl PromptStore for RedisStore {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<()> {
        let mut conn = self.conn.clone();
        let fields = [
            ("id", prompt.id.clone()),
            ("content", prompt.content.clone()),
            ("authorFid", prompt.author_fid.to_string()),
            ("createdAt", prompt.created_at.to_string()),
            ("expiresAt", prompt.expires_at.to_string()),
        ];

        redis::pipe()
            .atomic()
            .hset_multiple(prompt_key(&prompt.id), &fields[..])
            .ignore()
            .zadd(PROMPTS_BY_CREATED, &prompt.id, prompt.created_at)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::info!("Stored prompt {} by fid {}", prompt.id, prompt.author_fid);
        Ok(())
    }
}
