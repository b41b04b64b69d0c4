//! Bearer-token authentication and password hashing.

mod middleware;
mod password;
mod token;

pub use middleware::{authenticate, require_admin, require_auth};
pub use password::{hash_password, verify_password, HASH_COST};
pub use token::{bearer_token, Claims, TokenIssuer};
