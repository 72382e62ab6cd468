pub mod admin;
pub mod auth;
pub mod fund;
pub mod task;
pub mod user;
pub mod wheel;

pub use admin::admin_config;
pub use auth::auth_config;
pub use fund::fund_config;
pub use task::task_config;
pub use user::user_config;
pub use wheel::wheel_config;
