//! Authorization policy: permission checks and role-based visibility.

mod normalize;
mod policy;

pub use normalize::normalize_role_name;
pub use policy::{AuthorizationPolicy, RoleCategory, VisibilityScope, classify_role};
