use crate::domain::errors::VerificationError;
use crate::domain::transaction::Transaction;
use crate::ports::SignatureVerifier;

/// Largest signature accepted, in bytes.
pub const MAX_SIGNATURE_LEN: usize = 4_096;

/// Shape-only signature check: non-empty and at most `max_len` bytes.
///
/// Stands in where no key material is available; a production deployment
/// plugs a cryptographic verifier into the same port.
#[derive(Clone, Copy, Debug)]
pub struct StructuralSignatureVerifier {
    max_len: usize,
}

impl StructuralSignatureVerifier {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Default for StructuralSignatureVerifier {
    fn default() -> Self {
        Self::new(MAX_SIGNATURE_LEN)
    }
}

impl SignatureVerifier for StructuralSignatureVerifier {
    fn verify(&self, tx: &Transaction) -> Result<(), VerificationError> {
        let len = tx.signature().len();
        if len == 0 || len > self.max_len {
            return Err(VerificationError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let verifier = StructuralSignatureVerifier::new(4);

        assert!(verifier
            .verify(&Transaction::new("a", "b", 1, 0, vec![1; 4]))
            .is_ok());
        assert_eq!(
            verifier.verify(&Transaction::new("a", "b", 1, 0, vec![1; 5])),
            Err(VerificationError::InvalidSignature)
        );
        assert_eq!(
            verifier.verify(&Transaction::new("a", "b", 1, 0, vec![])),
            Err(VerificationError::InvalidSignature)
        );
    }
}
