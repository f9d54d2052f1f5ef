use crate::{
    models::{NewPrompt, Prompt},
    services::store::PromptStore,
};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ethers::types::Address;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Resolves a wallet address to the social-network user id (FID) that owns it.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fid_for_wallet(&self, address: Address) -> Result<u64>;
}

/// Client for the site's own JSON API.
#[derive(Clone)]
pub struct SiteApi {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct WalletUser {
    fid: u64,
}

impl SiteApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let base_url = Url::parse(base_url).context("Invalid site API base URL")?;
        if base_url.cannot_be_a_base() {
            bail!("Site API base URL cannot carry a path: {}", base_url);
        }

        Ok(Self { client, base_url })
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Site API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn fetch_prompt(&self, prompt_id: &str) -> Result<Prompt> {
        let url = self.endpoint(&["api", "prompts", prompt_id])?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            bail!("Prompt lookup for {} returned {}", prompt_id, response.status());
        }

        let prompt = response
            .json::<Prompt>()
            .await
            .with_context(|| format!("Invalid prompt payload for {}", prompt_id))?;

        tracing::debug!("Fetched prompt {}", prompt_id);
        Ok(prompt)
    }
}

#[async_trait]
impl UserDirectory for SiteApi {
    async fn fid_for_wallet(&self, address: Address) -> Result<u64> {
        let wallet = format!("{:?}", address);
        let url = self.endpoint(&["api", "users", "wallet", &wallet])?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            bail!("Wallet lookup for {:?} returned {}", address, response.status());
        }

        let user: WalletUser = response
            .json()
            .await
            .context("Invalid wallet lookup payload")?;

        Ok(user.fid)
    }
}

#[async_trait]
impl PromptStore for SiteApi {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<()> {
        let url = self.endpoint(&["api", "prompts"])?;
        let response = self.client.post(url).json(prompt).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Prompt create returned {}: {}", status, body);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn fetches_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/prompts/9")
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"9","content":"cried at a wedding","author":{"username":"alice"},"totalConfessions":12}"#)
            .create_async()
            .await;

        let api = SiteApi::new(&server.url()).unwrap();
        let prompt = api.fetch_prompt("9").await.unwrap();

        assert_eq!(prompt.content, "cried at a wedding");
        assert_eq!(prompt.total_confessions, 12);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_prompt_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/prompts/404")
            .with_status(404)
            .create_async()
            .await;

        let api = SiteApi::new(&server.url()).unwrap();
        assert!(api.fetch_prompt("404").await.is_err());
    }

    #[test]
    fn prompt_id_stays_one_segment() {
        let api = SiteApi::new("https://api.debbiedoes.fun/").unwrap();
        let url = api.endpoint(&["api", "prompts", "../users/wallet/0xabc"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.debbiedoes.fun/api/prompts/..%2Fusers%2Fwallet%2F0xabc"
        );

        let nested = SiteApi::new("https://x.io/v1").unwrap();
        assert_eq!(
            nested.endpoint(&["api", "prompts", "a b?"]).unwrap().as_str(),
            "https://x.io/v1/api/prompts/a%20b%3F"
        );
    }

    #[tokio::test]
    async fn resolves_fid_for_wallet() {
        let address =
            Address::from_str("0x00000000000000000000000000000000000000aa").unwrap();
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/api/users/wallet/0x00000000000000000000000000000000000000aa",
            )
            .with_body(r#"{"fid":4821}"#)
            .create_async()
            .await;

        let api = SiteApi::new(&server.url()).unwrap();
        assert_eq!(api.fid_for_wallet(address).await.unwrap(), 4821);
    }

    #[tokio::test]
    async fn posts_new_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/prompts")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"id":"42","authorFid":7}"#.to_string(),
            ))
            .with_status(201)
            .create_async()
            .await;

        let api = SiteApi::new(&server.url()).unwrap();
        api.create_prompt(&NewPrompt::new("42", "x", 7, 0)).await.unwrap();
        mock.assert_async().await;
    }
}
