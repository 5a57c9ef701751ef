mod session;

pub use session::{login_handler, logout_handler, me_handler};

/// Session key holding the authenticated identity.
pub const SESSION_USER_KEY: &str = "diagrid.user";
