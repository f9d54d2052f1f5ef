use crate::{
    models::{FrameActionBody, Prompt},
    routes::AppState,
};
use anyhow::{anyhow, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

const START_BUTTON: &str = "🤫 Start Confessing";

pub async fn frame_action(State(state): State<AppState>, body: Bytes) -> Response {
    match handle_frame(&state, &body).await {
        Ok(html) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response(),
        Err(e) => {
            tracing::error!("Error in frame handler: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error processing frame action").into_response()
        }
    }
}

async fn handle_frame(state: &AppState, body: &[u8]) -> Result<String> {
    let prompt_id = FrameActionBody::prompt_id(body)?;
    let prompt = state.site.fetch_prompt(&prompt_id).await?;
    render_frame(&state.public_url, &prompt_id, &prompt)
}

pub fn image_url(public_url: &str, prompt: &Prompt) -> Result<String> {
    let mut url = Url::parse(&format!("{}/api/og", public_url.trim_end_matches('/')))?;
    url.query_pairs_mut()
        .append_pair("author", prompt.author_name())
        .append_pair("content", &prompt.content)
        .append_pair("confessions", &prompt.total_confessions.to_string());
    Ok(url.into())
}

/// `{public_url}/prompts/{id}` with the id percent-encoded as one path segment.
pub fn prompt_url(public_url: &str, prompt_id: &str) -> Result<String> {
    let mut url = Url::parse(public_url)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Public URL cannot carry a path: {}", public_url))?
        .pop_if_empty()
        .extend(["prompts", prompt_id]);
    Ok(url.into())
}

/// Frame card for a prompt, redirecting browsers straight to the prompt page.
pub fn render_frame(public_url: &str, prompt_id: &str, prompt: &Prompt) -> Result<String> {
    let image = escape_attr(&image_url(public_url, prompt)?);
    let target = escape_attr(&prompt_url(public_url, prompt_id)?);
    let title = escape_attr(&format!("Never Have I Ever: {}", prompt.content));
    let description = format!("Join {} others in confessing", prompt.total_confessions);
    let state = escape_attr(prompt_id);

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{description}" />
    <meta property="og:image" content="{image}" />
    <meta property="fc:frame" content="vNext" />
    <meta property="fc:frame:post_url" content="{target}" />
    <meta property="fc:frame:image" content="{image}" />
    <meta property="fc:frame:button:1" content="{button}" />
    <meta property="fc:frame:state" content="{state}" />
    <meta http-equiv="refresh" content="0;url={target}" />
  </head>
  <body>
    <p>Redirecting to prompt...</p>
  </body>
</html>
"#,
        button = START_BUTTON,
    ))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(content: &str) -> Prompt {
        serde_json::from_value(serde_json::json!({
            "content": content,
            "author": { "username": "alice" },
            "totalConfessions": 12
        }))
        .unwrap()
    }

    #[test]
    fn frame_carries_state_and_post_url() {
        let html = render_frame("https://debbiedoes.fun", "17", &prompt("lied")).unwrap();

        assert!(html.contains(r#"<meta property="fc:frame:state" content="17" />"#));
        assert!(html.contains(
            r#"<meta property="fc:frame:post_url" content="https://debbiedoes.fun/prompts/17" />"#
        ));
        assert!(html.contains(r#"content="0;url=https://debbiedoes.fun/prompts/17""#));
        assert!(html.contains("Join 12 others in confessing"));
    }

    #[test]
    fn image_url_encodes_query() {
        let url = image_url("https://debbiedoes.fun/", &prompt("kissed & told")).unwrap();
        assert_eq!(
            url,
            "https://debbiedoes.fun/api/og?author=alice&content=kissed+%26+told&confessions=12"
        );
    }

    #[test]
    fn state_with_slashes_stays_under_prompts() {
        let html = render_frame(
            "https://debbiedoes.fun",
            "../users/wallet/0xabc",
            &prompt("lied"),
        )
        .unwrap();

        assert!(html.contains(
            r#"content="https://debbiedoes.fun/prompts/..%2Fusers%2Fwallet%2F0xabc""#
        ));
        assert!(html.contains(
            r#"<meta property="fc:frame:state" content="../users/wallet/0xabc" />"#
        ));
        assert!(!html.contains("/prompts/../"));
    }

    #[test]
    fn padded_state_is_echoed_verbatim() {
        let html = render_frame("https://debbiedoes.fun", " 17 ", &prompt("lied")).unwrap();
        assert!(html.contains(r#"<meta property="fc:frame:state" content=" 17 " />"#));
    }

    #[test]
    fn content_is_escaped() {
        let html = render_frame("https://x.io", "1", &prompt(r#"said "<hi>""#)).unwrap();
        assert!(html.contains("Never Have I Ever: said &quot;&lt;hi&gt;&quot;"));
        assert!(!html.contains("<hi>"));
    }
}
