//! Request authentication: HMAC signatures over the canonical request URL.

pub mod middleware;
pub mod signature;

pub use middleware::{request_url, require_signature};
pub use signature::{canonical_url, compute_mac, DigestAlgorithm, HmacKey, SignatureVerifier};
