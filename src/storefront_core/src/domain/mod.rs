pub mod credentials;
pub mod identity;
pub mod product;
pub mod registration;
pub mod role;
pub mod session_state;
