pub mod claims;
pub mod codec;
pub mod error_code;
pub mod factory;

pub use claims::{Claims, UserRole};
pub use codec::{ClaimsCodec, ClaimsError, strip_bearer};
pub use error_code::{AuthErrorKind, ErrorEntry, lookup};
pub use factory::build_claims_codec;
