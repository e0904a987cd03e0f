//! Identity, sessions, and the authorization gate.
//! Keep the public surface thin and split implementation across sub-modules.

mod role;
mod password;
mod session;
mod gate;

pub use role::Role;
pub use password::{hash_password, verify_password};
pub use session::{Session, SessionToken, SessionRegistry};
pub use gate::{bearer_token, authenticate, require_admin};
