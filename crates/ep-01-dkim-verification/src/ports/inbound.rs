//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::VerifiedEmail;
use crate::domain::errors::VerificationError;

/// Primary Email Verification API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait EmailVerificationApi: Send + Sync {
    /// Verify the single DKIM signature of a raw message and produce the
    /// circuit inputs.
    ///
    /// # Errors
    /// Any structural, policy, resolution or body hash failure. No artifacts
    /// are produced on error.
    fn verify(&self, raw_message: &[u8]) -> Result<VerifiedEmail, VerificationError>;
}
