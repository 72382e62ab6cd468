use crate::entities::task_run_entity as task_runs;
use crate::models::ApprovalSettings;

/// 自动审批策略 (纯谓词, 设置由调用方按请求加载后传入)。
/// 仅供审批入口参考; complete 本身不做价格限制。
pub fn should_auto_approve(run: &task_runs::Model, settings: &ApprovalSettings) -> bool {
    if settings.auto_approve_all {
        return true;
    }
    match settings.auto_approve_threshold_cents {
        Some(threshold) => run.assigned_price_cents <= threshold,
        None => false,
    }
}
