/// Authentication and authorization
///
/// - `principal`: the authenticated actor attached to every operation
/// - `policy`: pure role/ownership rules gating mutations and listings
/// - `password`: Argon2id hashing and verification
/// - `tokens`: HS256 access-token issuance and validation
pub mod password;
pub mod policy;
pub mod principal;
pub mod tokens;

pub use principal::Principal;
