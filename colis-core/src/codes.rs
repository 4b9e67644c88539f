//! One-time completion codes gating the terminal warehouse deposit.

use constant_time_eq::constant_time_eq;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of an issued completion code.
const CODE_LEN: usize = 6;

/// Issues and verifies mission completion codes.
///
/// A code is issued once at mission creation and may be verified any number
/// of times until the mission reaches its terminal state; verification is a
/// gate checked on every terminal-transition attempt, not consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionCodeService;

impl CompletionCodeService {
    /// Generate a fresh random alphanumeric code.
    pub fn issue(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect()
    }

    /// Constant-time comparison of the supplied code against the issued one.
    pub fn verify(&self, issued: &str, supplied: &str) -> bool {
        constant_time_eq(issued.as_bytes(), supplied.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_codes_are_uppercase_alphanumeric() {
        let service = CompletionCodeService;
        let code = service.issue();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn verify_accepts_exact_match_only() {
        let service = CompletionCodeService;
        let code = service.issue();
        assert!(service.verify(&code, &code));
        assert!(!service.verify(&code, "WRONG"));
        assert!(!service.verify(&code, &code.to_ascii_lowercase()));
        assert!(!service.verify(&code, ""));
    }

    #[test]
    fn verify_is_repeatable() {
        let service = CompletionCodeService;
        let code = service.issue();
        for _ in 0..3 {
            assert!(service.verify(&code, &code));
        }
    }
}
