use std::fmt;
use std::str::FromStr;

use hmac::digest::{InvalidLength, KeyInit};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;

use crate::error::{RelayError, Result};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Digest backing the request MAC.
///
/// `Sha1` matches the signers already deployed alongside Deis; `Sha256` is the
/// stronger choice for new installations. Signer and verifier must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "hmac-sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" | "hmac-sha256" => Ok(DigestAlgorithm::Sha256),
            other => Err(format!("unsupported HMAC algorithm: {}", other)),
        }
    }
}

/// Pre-shared HMAC secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey(Vec<u8>);

impl HmacKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacKey([redacted])")
    }
}

/// Rebuild the URL a client signed: configured scheme, the request host, and the
/// request target exactly as received.
pub fn canonical_url(scheme: &str, host: &str, path_and_query: &str) -> String {
    format!("{}://{}{}", scheme, host, path_and_query)
}

fn keyed_mac<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> std::result::Result<M, InvalidLength> {
    let mut mac = <M as Mac>::new_from_slice(key)?;
    mac.update(message);
    Ok(mac)
}

/// Compute the raw MAC of `message` under `key`.
pub fn compute_mac(
    algorithm: DigestAlgorithm,
    key: &[u8],
    message: &[u8],
) -> std::result::Result<Vec<u8>, InvalidLength> {
    Ok(match algorithm {
        DigestAlgorithm::Sha1 => keyed_mac::<HmacSha1>(key, message)?
            .finalize()
            .into_bytes()
            .to_vec(),
        DigestAlgorithm::Sha256 => keyed_mac::<HmacSha256>(key, message)?
            .finalize()
            .into_bytes()
            .to_vec(),
    })
}

fn verify_mac<M: Mac + KeyInit>(key: &[u8], message: &[u8], claimed: &[u8]) -> bool {
    // verify_slice is constant-time; a length mismatch is a plain failure.
    keyed_mac::<M>(key, message)
        .map(|mac| mac.verify_slice(claimed).is_ok())
        .unwrap_or(false)
}

/// Signs and verifies canonical request URLs with the deployment's shared secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: Option<HmacKey>,
    algorithm: DigestAlgorithm,
    debug: bool,
}

impl SignatureVerifier {
    pub fn new(key: Option<HmacKey>, algorithm: DigestAlgorithm) -> Self {
        Self {
            key,
            algorithm,
            debug: false,
        }
    }

    /// Log requested, provided and expected MACs on every verification.
    ///
    /// Leaks the expected signature into the logs; never enable in production.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hex-encoded MAC of `url`, as a client should send it in `Authorization`.
    pub fn sign(&self, url: &str) -> Result<String> {
        let key = self.key.as_ref().ok_or(RelayError::MissingSecret)?;
        let mac = compute_mac(self.algorithm, key.as_bytes(), url.as_bytes())
            .map_err(|_| RelayError::MissingSecret)?;
        Ok(hex::encode(mac))
    }

    /// Check `claimed_hex` against the MAC of `url`.
    pub fn verify(&self, url: &str, claimed_hex: &str) -> Result<()> {
        let key = self.key.as_ref().ok_or(RelayError::MissingSecret)?;

        let claimed = hex::decode(claimed_hex).map_err(|_| RelayError::InvalidSignature)?;

        if self.debug {
            let expected = compute_mac(self.algorithm, key.as_bytes(), url.as_bytes())
                .map(hex::encode)
                .unwrap_or_default();
            debug!("Requested URL: {}", url);
            debug!("Provided HMAC: {}", claimed_hex);
            debug!("Expected HMAC: {}", expected);
        }

        let valid = match self.algorithm {
            DigestAlgorithm::Sha1 => verify_mac::<HmacSha1>(key.as_bytes(), url.as_bytes(), &claimed),
            DigestAlgorithm::Sha256 => {
                verify_mac::<HmacSha256>(key.as_bytes(), url.as_bytes(), &claimed)
            }
        };

        if valid {
            Ok(())
        } else {
            Err(RelayError::InvalidSignature)
        }
    }
}
