use crate::pipeline::wire::Candidate;
use crate::types::InputRecord;

/// Result of submitting one batch for verification.
#[derive(Debug)]
pub enum VerificationOutcome {
    Success(Vec<Candidate>),
    /// The service refused the batch payload as a whole. The batch is
    /// dropped and the run continues.
    RecoverableRejection(String),
    /// Anything else: transport failure, unexpected status, unreadable body.
    FatalFailure(String),
}

/// One blocking round trip to an address verification service.
pub trait VerificationPort {
    fn verify(&self, batch: &[InputRecord]) -> VerificationOutcome;
}

impl<T: VerificationPort + ?Sized> VerificationPort for &T {
    fn verify(&self, batch: &[InputRecord]) -> VerificationOutcome {
        (**self).verify(batch)
    }
}

impl<T: VerificationPort + ?Sized> VerificationPort for Box<T> {
    fn verify(&self, batch: &[InputRecord]) -> VerificationOutcome {
        (**self).verify(batch)
    }
}
