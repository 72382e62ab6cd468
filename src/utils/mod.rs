pub mod jwt;
pub mod pagination;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationParams};
pub use password::{hash_password, verify_password};
