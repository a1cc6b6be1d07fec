/// Authentication module
///
/// Access-token issuing and verification plus password hashing. Token
/// invalidation is claim-based: a version counter embedded at issue time
/// is compared against the stored account on every authenticated use.

mod claims;
mod codec;
mod password;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use password::hash_password;
pub use password::verify_against_fallback;
pub use password::verify_password;
