//! Bearer token issuance, verification, and revocation.

pub mod authority;
pub mod claims;
pub mod fingerprint;
pub mod revocation;

pub use authority::TokenAuthority;
pub use claims::Claims;
pub use fingerprint::fingerprint;
pub use revocation::RevocationStore;
