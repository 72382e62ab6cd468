pub mod fund_requests;
pub mod platform_settings;
pub mod shop_groups;
pub mod task_products;
pub mod task_runs;
pub mod tasks;
pub mod transactions;
pub mod users;
pub mod vip_levels;
pub mod wheel_prizes;
pub mod wheel_spins;

pub use fund_requests as fund_request_entity;
pub use fund_requests::{FundDirection, FundRequestStatus};
pub use platform_settings as platform_setting_entity;
pub use shop_groups as shop_group_entity;
pub use task_products as task_product_entity;
pub use task_runs as task_run_entity;
pub use task_runs::TaskRunState;
pub use tasks as task_entity;
pub use transactions as transaction_entity;
pub use transactions::{TransactionStatus, TransactionType};
pub use users as user_entity;
pub use users::UserRole;
pub use vip_levels as vip_level_entity;
pub use wheel_prizes as wheel_prize_entity;
pub use wheel_spins as wheel_spin_entity;
