use serde::{Deserialize, Serialize};

/// Prompts stay open for confessions for 24 hours after creation.
pub const PROMPT_LIFETIME_MS: i64 = 86_400 * 1000;

/// Prompt as served by `GET /api/prompts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub author: Option<PromptAuthor>,
    #[serde(default)]
    pub total_confessions: u64,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptAuthor {
    #[serde(default)]
    pub username: Option<String>,
}

impl Prompt {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.username.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or("anonymous")
    }
}

/// A prompt minted on-chain, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    pub id: String,
    pub content: String,
    pub author_fid: u64,
    pub created_at: i64,
    pub expires_at: i64,
}

impl NewPrompt {
    pub fn new(id: impl Into<String>, content: impl Into<String>, author_fid: u64, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author_fid,
            created_at: now_ms,
            expires_at: now_ms + PROMPT_LIFETIME_MS,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("prompt id is empty");
        }
        if self.content.trim().is_empty() {
            anyhow::bail!("prompt content is empty");
        }
        if self.expires_at <= self.created_at {
            anyhow::bail!("prompt expires before it is created");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_defaults_to_anonymous() {
        let prompt: Prompt =
            serde_json::from_str(r#"{"content":"lied","totalConfessions":3}"#).unwrap();
        assert_eq!(prompt.author_name(), "anonymous");

        let prompt: Prompt = serde_json::from_str(
            r#"{"content":"lied","author":{"username":"dwr"},"totalConfessions":3}"#,
        )
        .unwrap();
        assert_eq!(prompt.author_name(), "dwr");
    }

    #[test]
    fn new_prompt_expires_a_day_later() {
        let prompt = NewPrompt::new("42", "been to space", 7, 1_000);
        assert_eq!(prompt.expires_at - prompt.created_at, 86_400_000);
        assert!(prompt.validate().is_ok());
    }

    #[test]
    fn new_prompt_serializes_camel_case() {
        let json = serde_json::to_value(NewPrompt::new("1", "x", 2, 0)).unwrap();
        assert_eq!(json["authorFid"], 2);
        assert_eq!(json["expiresAt"], 86_400_000);
    }
}
