pub mod admin;
pub mod auth;
pub mod common;
pub mod fund;
pub mod task;
pub mod transaction;
pub mod user;
pub mod vip;
pub mod wheel;

pub use admin::*;
pub use auth::*;
pub use common::*;
pub use fund::*;
pub use task::*;
pub use transaction::*;
pub use user::*;
pub use vip::*;
pub use wheel::*;
