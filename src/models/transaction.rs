use crate::entities::{transaction_entity as transactions, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub txn_type: TransactionType,
    /// 带符号金额(美分)
    pub amount_cents: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub status: TransactionStatus,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(t: transactions::Model) -> Self {
        Self {
            id: t.id,
            txn_type: t.txn_type,
            amount_cents: t.amount_cents,
            balance_before: t.balance_before,
            balance_after: t.balance_after,
            status: t.status,
            reference_id: t.reference_id,
            description: t.description,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
