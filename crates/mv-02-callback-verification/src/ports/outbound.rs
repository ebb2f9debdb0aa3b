//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::algorithm::SignatureAlgorithm;
use mv_01_key_resolver::KeyMaterial;

/// A signature primitive the verifier can delegate to.
///
/// Implementations are selected by `accepts`, so adding an algorithm does not
/// touch the verification pipeline.
pub trait SignatureScheme: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this scheme handles `algorithm` with keys of this family.
    fn accepts(&self, algorithm: SignatureAlgorithm, key: &KeyMaterial) -> bool;

    /// Check `signature` over `message`. Malformed keys or signatures are
    /// reported as `false`.
    fn verify(&self, message: &[u8], signature: &[u8], key: &KeyMaterial) -> bool;
}

/// Time source abstraction for testability
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
