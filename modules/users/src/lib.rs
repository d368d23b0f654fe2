//! Sign-in surface of the store: the social-login endpoint and the login page.
//!
//! Social login is accepted and validated but not performed yet.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersModule;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
