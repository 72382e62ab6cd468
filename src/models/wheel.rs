use crate::entities::{wheel_prize_entity as prizes, wheel_spin_entity as spins};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelPrizeResponse {
    pub id: i64,
    pub name: String,
    pub value_cents: i64,
    pub probability_bp: i32,
}

impl From<prizes::Model> for WheelPrizeResponse {
    fn from(p: prizes::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            value_cents: p.value_cents,
            probability_bp: p.probability_bp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelSpinResponse {
    pub spin_id: i64,
    pub prize: WheelPrizeBrief,
    /// 本次抽奖后剩余的免费次数
    pub free_spins_remaining: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelPrizeBrief {
    pub id: i64,
    pub name: String,
    pub value_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelSpinRecordResponse {
    pub id: i64,
    pub prize_name: String,
    pub value_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<spins::Model> for WheelSpinRecordResponse {
    fn from(s: spins::Model) -> Self {
        Self {
            id: s.id,
            prize_name: s.prize_name,
            value_cents: s.value_cents,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelRecordQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
