use serde::Deserialize;

/// Signed frame interaction payload. Only the untrusted half is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameActionBody {
    pub untrusted_data: UntrustedData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UntrustedData {
    pub state: String,
}

impl FrameActionBody {
    /// Parses a raw request body and returns the prompt id carried in `state`,
    /// exactly as sent.
    pub fn prompt_id(bytes: &[u8]) -> anyhow::Result<String> {
        let body: FrameActionBody = serde_json::from_slice(bytes)?;
        let state = body.untrusted_data.state;
        match state.trim() {
            "" => anyhow::bail!("frame state is empty"),
            // dot segments would be dropped from the prompt path
            "." | ".." => anyhow::bail!("frame state is not a prompt id: {:?}", state),
            _ => Ok(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_state() {
        let raw = br#"{"untrustedData":{"fid":3,"state":"17"},"trustedData":{"messageBytes":"ab"}}"#;
        assert_eq!(FrameActionBody::prompt_id(raw).unwrap(), "17");
    }

    #[test]
    fn rejects_missing_or_blank_state() {
        assert!(FrameActionBody::prompt_id(br#"{"untrustedData":{}}"#).is_err());
        assert!(FrameActionBody::prompt_id(br#"{"untrustedData":{"state":"  "}}"#).is_err());
        assert!(FrameActionBody::prompt_id(b"not json").is_err());
    }

    #[test]
    fn state_is_returned_verbatim() {
        let raw = br#"{"untrustedData":{"state":" 17 "}}"#;
        assert_eq!(FrameActionBody::prompt_id(raw).unwrap(), " 17 ");
    }

    #[test]
    fn rejects_dot_segments() {
        assert!(FrameActionBody::prompt_id(br#"{"untrustedData":{"state":".."}}"#).is_err());
        assert!(FrameActionBody::prompt_id(br#"{"untrustedData":{"state":"."}}"#).is_err());
    }
}
