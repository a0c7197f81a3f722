//! `stockline-auth`
//!
//! **Responsibility:** roles, user accounts, and the request-scoped principal.
//!
//! Authentication *mechanics* (passwords, tokens) are out of scope: upstream
//! resolves an API key to a [`Principal`] and the rest of the system only
//! ever sees that value. Role is the sole capability axis.

pub mod principal;
pub mod roles;
pub mod user;

pub use principal::Principal;
pub use roles::Role;
pub use user::UserAccount;
