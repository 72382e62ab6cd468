use crate::entities::{fund_request_entity as fund_requests, FundDirection, FundRequestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFundRequest {
    /// 金额(美分), 必须为正
    #[schema(example = 10000)]
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FundRequestResponse {
    pub id: i64,
    pub direction: FundDirection,
    pub amount_cents: i64,
    pub status: FundRequestStatus,
    pub review_note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<fund_requests::Model> for FundRequestResponse {
    fn from(r: fund_requests::Model) -> Self {
        Self {
            id: r.id,
            direction: r.direction,
            amount_cents: r.amount_cents,
            status: r.status,
            review_note: r.review_note,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FundRecordQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<FundRequestStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewFundRequest {
    pub note: Option<String>,
}
