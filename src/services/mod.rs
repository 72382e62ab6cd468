pub mod approval;
pub mod auth_service;
pub mod catalog_service;
pub mod finance_service;
pub mod ledger_service;
pub mod settings_service;
pub mod task_run_service;
pub mod user_service;
pub mod vip_service;
pub mod wheel_service;

pub use approval::should_auto_approve;
pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use finance_service::FinanceService;
pub use ledger_service::{LedgerEntry, LedgerService};
pub use settings_service::SettingsService;
pub use task_run_service::{compute_reward, TaskRunService};
pub use user_service::UserService;
pub use vip_service::VipService;
pub use wheel_service::WheelService;
