/// Errors surfaced by the commitment, blind signature and issuance layers.
///
/// Pure verification functions do not use this type for negative results; they return `bool`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),
    #[error("opening proof verification failed")]
    ProofVerificationFailed,
    #[error("signature verification failed")]
    SignatureVerificationFailed,
    #[error("application has already been decided")]
    AlreadyDecided,
    #[error("modular inverse is undefined")]
    ModularInverseUndefined,
    #[error("unblinded token does not verify")]
    UnblindFailed,
    #[error("unknown application")]
    UnknownApplication,
    #[error("application has not been approved")]
    NotApproved,
}
