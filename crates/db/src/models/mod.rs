//! Entity models and DTOs.
//!
//! Row structs derive `FromRow` and `Serialize`; Create/Update DTOs derive
//! `Deserialize`, with `Option` meaning "not supplied" on updates.

pub mod activity;
pub mod member;
