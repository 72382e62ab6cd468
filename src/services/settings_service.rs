use crate::entities::platform_settings;
use crate::error::AppResult;
use crate::models::{ApprovalSettings, UpdateSettingsRequest};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

const SETTINGS_ROW_ID: i64 = 1;

/// 审批设置的加载/更新。设置按请求加载为值对象传入策略函数,
/// 进程内不持有可变全局。
#[derive(Clone)]
pub struct SettingsService {
    pool: DatabaseConnection,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 当前审批设置 (行缺失时回落到默认: 全部人工审批)
    pub async fn load(&self) -> AppResult<ApprovalSettings> {
        let row = platform_settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?;

        Ok(match row {
            Some(s) => ApprovalSettings {
                auto_approve_all: s.auto_approve_all,
                auto_approve_threshold_cents: s.auto_approve_threshold_cents,
            },
            None => ApprovalSettings {
                auto_approve_all: false,
                auto_approve_threshold_cents: None,
            },
        })
    }

    /// 管理端更新设置
    pub async fn update(&self, request: UpdateSettingsRequest) -> AppResult<ApprovalSettings> {
        let existing = platform_settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?;

        let updated = match existing {
            Some(row) => {
                let mut am = row.into_active_model();
                if let Some(all) = request.auto_approve_all {
                    am.auto_approve_all = Set(all);
                }
                if request.clear_threshold {
                    am.auto_approve_threshold_cents = Set(None);
                } else if let Some(threshold) = request.auto_approve_threshold_cents {
                    am.auto_approve_threshold_cents = Set(Some(threshold));
                }
                am.updated_at = Set(Some(Utc::now()));
                am.update(&self.pool).await?
            }
            None => {
                platform_settings::ActiveModel {
                    id: Set(SETTINGS_ROW_ID),
                    auto_approve_all: Set(request.auto_approve_all.unwrap_or(false)),
                    auto_approve_threshold_cents: Set(if request.clear_threshold {
                        None
                    } else {
                        request.auto_approve_threshold_cents
                    }),
                    updated_at: Set(Some(Utc::now())),
                }
                .insert(&self.pool)
                .await?
            }
        };

        Ok(ApprovalSettings {
            auto_approve_all: updated.auto_approve_all,
            auto_approve_threshold_cents: updated.auto_approve_threshold_cents,
        })
    }
}
