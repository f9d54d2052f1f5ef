use ethers::{
    abi::RawLog,
    contract::EthEvent,
    prelude::*,
    types::{Address, Log, TransactionReceipt, H256},
};

// Prompt registry deployed on Base
abigen!(
    ConfessionsContract,
    r#"[
        function createPrompt(string content) external payable returns (uint256)
        event PromptCreated(uint256 indexed promptId, address indexed author, string content, uint256 expiresAt)
    ]"#
);

/// topic0 of `PromptCreated(uint256,address,string,uint256)`.
pub fn prompt_created_topic() -> H256 {
    PromptCreatedFilter::signature()
}

/// First log in the receipt emitted by `contract` whose topic0 is `PromptCreated`.
pub fn find_prompt_created(receipt: &TransactionReceipt, contract: Address) -> Option<&Log> {
    let topic = prompt_created_topic();
    receipt
        .logs
        .iter()
        .find(|log| log.address == contract && log.topics.first() == Some(&topic))
}

pub fn decode_prompt_created(log: &Log) -> Result<PromptCreatedFilter, ethers::abi::Error> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    <PromptCreatedFilter as EthEvent>::decode_log(&raw)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use ethers::abi::{encode, Token};

    pub fn address_topic(address: Address) -> H256 {
        let mut topic = [0u8; 32];
        topic[12..].copy_from_slice(address.as_bytes());
        H256::from(topic)
    }

    pub fn prompt_created_log(contract: Address, prompt_id: u64, author: Address) -> Log {
        let data = encode(&[
            Token::String("stolen a traffic cone".to_string()),
            Token::Uint(U256::from(1_700_086_400u64)),
        ]);

        Log {
            address: contract,
            topics: vec![
                prompt_created_topic(),
                H256::from_low_u64_be(prompt_id),
                address_topic(author),
            ],
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn receipt_with(logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt {
            logs,
            status: Some(1u64.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::str::FromStr;

    fn contract() -> Address {
        Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap()
    }

    fn author() -> Address {
        Address::from_low_u64_be(0xbeef)
    }

    #[test]
    fn topic_is_keccak_of_signature() {
        assert_eq!(
            prompt_created_topic(),
            H256::from(ethers::utils::keccak256(
                "PromptCreated(uint256,address,string,uint256)"
            ))
        );
    }

    #[test]
    fn decodes_prompt_id() {
        let log = prompt_created_log(contract(), 42, author());
        let event = decode_prompt_created(&log).unwrap();

        assert_eq!(event.prompt_id.to_string(), "42");
        assert_eq!(event.author, author());
        assert_eq!(event.content, "stolen a traffic cone");
    }

    #[test]
    fn skips_logs_from_other_contracts() {
        let other = Address::from_low_u64_be(1);
        let mut transfer = prompt_created_log(contract(), 1, author());
        transfer.topics[0] = H256::from_low_u64_be(7);

        let receipt = receipt_with(vec![
            prompt_created_log(other, 9, author()),
            transfer,
            prompt_created_log(contract(), 42, author()),
        ]);

        let log = find_prompt_created(&receipt, contract()).unwrap();
        assert_eq!(decode_prompt_created(log).unwrap().prompt_id, U256::from(42));
    }

    #[test]
    fn no_match_when_event_absent() {
        let receipt = receipt_with(vec![prompt_created_log(Address::zero(), 3, author())]);
        assert!(find_prompt_created(&receipt, contract()).is_none());
    }
}
