//! On-chain payment and contribution records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, require_positive, Resource, Validate};
use crate::error::Result;
use crate::storage::traits::{to_document, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Contribution,
    Purchase,
    Refund,
    Stake,
    Unstake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionCreate {
    pub kind: TransactionKind,
    pub user_id: String,
    pub project_id: Option<String>,
    pub order_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub blockchain: Option<String>,
    pub wallet_address: Option<String>,
    /// Opaque chain reference, stored as given
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Validate for TransactionCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("currency", &self.currency)?;
        require_positive("amount", self.amount)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub status: Option<TransactionStatus>,
    pub tx_hash: Option<String>,
    pub admin_notes: Option<String>,
}

impl Validate for TransactionUpdate {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub user_id: String,
    pub project_id: Option<String>,
    pub order_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub blockchain: Option<String>,
    pub wallet_address: Option<String>,
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Transactions;

impl Resource for Transactions {
    const NAME: &'static str = "Transaction";
    const PATH: &'static str = "transactions";
    const COLLECTION: &'static str = "transactions";
    const FILTER_FIELDS: &'static [&'static str] = &["status", "kind", "user_id", "project_id"];

    type Create = TransactionCreate;
    type Update = TransactionUpdate;

    fn create_document(
        payload: TransactionCreate,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Document> {
        to_document(&Transaction {
            id,
            kind: payload.kind,
            user_id: payload.user_id,
            project_id: payload.project_id,
            order_id: payload.order_id,
            amount: payload.amount,
            currency: payload.currency,
            blockchain: payload.blockchain,
            wallet_address: payload.wallet_address,
            tx_hash: payload.tx_hash,
            status: payload.status,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        })
    }
}
