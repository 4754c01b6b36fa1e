/// Batch aggregate and its encodings for the caller
use super::types::{CandidateId, CandidateOutcome};
use crate::config::ResultEncoding;

/// Candidates acted upon in one run, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    acted_ids: Vec<CandidateId>,
}

impl BatchResult {
    pub fn new(acted_ids: Vec<CandidateId>) -> Self {
        Self { acted_ids }
    }

    /// Keep only the `Acted` outcomes
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a (CandidateId, CandidateOutcome)>,
    {
        Self {
            acted_ids: outcomes
                .into_iter()
                .filter(|(_, outcome)| outcome.is_acted())
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.acted_ids.len()
    }

    pub fn ids(&self) -> &[CandidateId] {
        &self.acted_ids
    }

    /// Raw bytes: a 32-byte big-endian word for `Count`, UTF-8 JSON for `Ids`
    pub fn encode(&self, encoding: ResultEncoding) -> Vec<u8> {
        match encoding {
            ResultEncoding::Count => encode_uint256(self.count() as u128).to_vec(),
            ResultEncoding::Ids => self.ids_json().into_bytes(),
        }
    }

    /// Printable form: `0x`-prefixed hex word for `Count`, JSON for `Ids`
    pub fn render(&self, encoding: ResultEncoding) -> String {
        let bytes = self.encode(encoding);
        match encoding {
            ResultEncoding::Count => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                format!("0x{}", hex)
            }
            ResultEncoding::Ids => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn ids_json(&self) -> String {
        let ids: Vec<&str> = self.acted_ids.iter().map(CandidateId::as_str).collect();
        // Serializing a slice of &str cannot fail
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }
}

/// ABI uint256 word, big-endian, left-padded with zeros
pub fn encode_uint256(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}
