//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod member_repo;
pub mod role_repo;

pub use activity_repo::ActivityRepo;
pub use member_repo::MemberRepo;
pub use role_repo::RoleRepo;
