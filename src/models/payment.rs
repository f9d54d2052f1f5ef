use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Detail record stored for each paying user of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub user_address: String,
    pub tx_hash: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// False when the user was already in the paid-set; nothing was written.
    pub newly_recorded: bool,
    pub total_paid: u64,
}

/// Raw POST body fields. Each is read on its own so one malformed value
/// does not hide the others from the diagnostics echo.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequest {
    pub wallet_address: Option<Value>,
    pub user_fid: Option<Value>,
    pub tx_hash: Option<Value>,
}

/// A payment request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub wallet_address: String,
    pub user_fid: String,
    pub tx_hash: String,
}

impl PaymentRequest {
    /// Anything other than a JSON object yields an empty request.
    pub fn from_body(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(mut fields)) => {
                let mut take = |name: &str| fields.remove(name).filter(|v| !v.is_null());
                Self {
                    wallet_address: take("walletAddress"),
                    user_fid: take("userFid"),
                    tx_hash: take("txHash"),
                }
            }
            Ok(other) => {
                tracing::warn!("[Payment API] Payment body is not an object: {}", other);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("[Payment API] Unreadable payment body: {}", e);
                Self::default()
            }
        }
    }

    pub fn echo(&self) -> PaymentInput {
        PaymentInput {
            wallet_address: self.wallet_address.as_ref().map(echo_value),
            user_fid: self.user_fid.as_ref().map(echo_value),
            tx_hash: self.tx_hash.as_ref().map(echo_value),
        }
    }

    /// Returns `None` when any field is absent, blank or of the wrong type.
    /// FIDs arrive as either JSON numbers or strings depending on the client.
    pub fn validate(&self) -> Option<NewPayment> {
        let user_fid = match self.user_fid.as_ref()? {
            Value::Number(n) => n.as_u64()?.to_string(),
            other => text(Some(other))?,
        };

        Some(NewPayment {
            wallet_address: text(self.wallet_address.as_ref())?.to_lowercase(),
            user_fid,
            tx_hash: text(self.tx_hash.as_ref())?,
        })
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn echo_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Request fields echoed back in diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub wallet_address: Option<String>,
    pub user_fid: Option<String>,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_fid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<PaymentInput>,
    pub timestamp: i64,
}

impl DebugLog {
    pub fn now() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub has_paid: bool,
    pub total_paid: u64,
    pub debug_log: DebugLog,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecorded {
    pub message: String,
    pub has_paid: bool,
    pub total_paid: u64,
    pub debug_log: DebugLog,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PaymentInput>,
    pub debug_log: DebugLog,
}
