// record.rs — Attestation record, digest, and mock identifiers.
//
// The record mirrors the ledger schema
//   string app,string username,string goal,string result,bool disputed,string ref
// and its SHA-256 digest (hex, over the compact JSON encoding) travels with
// it so the ledger entry can be checked against the goal later.

use pod_goal::{Goal, Verdict};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Application tag written into every attestation.
pub const APP_NAME: &str = "ProofOfDay";

/// Ledger schema the record is encoded against.
pub const SCHEMA: &str =
    "string app,string username,string goal,string result,bool disputed,string ref";

/// Transaction reference reported for mocked attestations.
pub const MOCK_TX_REF: &str = "0xMOCK";

/// A finalized goal outcome to be published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttestationRecord {
    pub app: String,
    pub username: String,
    pub goal: String,
    pub result: Verdict,
    pub disputed: bool,
    /// The goal id the attestation refers back to.
    #[serde(rename = "ref")]
    pub reference: String,
}

impl AttestationRecord {
    pub fn for_goal(goal: &Goal, result: Verdict, disputed: bool) -> Self {
        Self {
            app: APP_NAME.to_string(),
            username: goal.owner.clone(),
            goal: goal.title.clone(),
            result,
            disputed,
            reference: goal.id.to_string(),
        }
    }

    /// Lowercase hex SHA-256 of the record's compact JSON encoding.
    pub fn digest(&self) -> String {
        // Serializing a struct of strings/bools/unit enums cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&json);
        format!("{:x}", hasher.finalize())
    }

    /// Deterministic identifier used when no real ledger is involved.
    pub fn mock_id(&self) -> String {
        if self.disputed {
            format!("MOCK-{}-DISPUTED-{}", self.result, self.reference)
        } else {
            format!("MOCK-{}-{}", self.result, self.reference)
        }
    }

    /// A mocked attestation for this record.
    pub fn mocked(&self) -> Attestation {
        Attestation {
            attestation_id: self.mock_id(),
            tx_ref: MOCK_TX_REF.to_string(),
            mocked: true,
        }
    }
}

/// What the ledger returns for a published record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attestation {
    pub attestation_id: String,
    pub tx_ref: String,
    pub mocked: bool,
}
