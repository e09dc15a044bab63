//! Entropy failure capture for crates that draw through `fill_bytes`
//!
//! `rsa` key generation and the randomized signers call
//! [`RngCore::fill_bytes`], which panics on sources such as `OsRng` when the
//! operating system cannot supply entropy. [`GuardedRng`] routes every draw
//! through `try_fill_bytes` instead, remembers the first failure and keeps the
//! caller going with a throwaway stream. The caller then discards whatever was
//! produced and reports the recorded failure.

use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use rand_core::{CryptoRng, CryptoRngCore, Error, RngCore};

pub struct GuardedRng<'a, R: ?Sized> {
    inner: &'a mut R,
    failure: Option<Error>,
    filler: Option<ChaCha20Rng>,
}

impl<'a, R: CryptoRngCore + ?Sized> GuardedRng<'a, R> {
    pub fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            failure: None,
            filler: None,
        }
    }

    /// Whether any draw has failed so far
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The first failure from the wrapped source, if there was one
    pub fn finish(self) -> Result<(), Error> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Run `f` against a guarded `rng`; its output is only returned if every
/// draw succeeded
pub fn with_guarded_rng<R, T, F>(rng: &mut R, f: F) -> Result<T, Error>
where
    R: CryptoRngCore + ?Sized,
    F: FnOnce(&mut GuardedRng<'_, R>) -> T,
{
    let mut guarded = GuardedRng::new(rng);
    let output = f(&mut guarded);
    guarded.finish().map(|()| output)
}

impl<R: CryptoRngCore + ?Sized> RngCore for GuardedRng<'_, R> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        // never fails, see try_fill_bytes
        let _ = self.try_fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        if self.failure.is_none() {
            match self.inner.try_fill_bytes(dest) {
                Ok(()) => return Ok(()),
                Err(error) => self.failure = Some(error),
            }
        }
        self.filler
            .get_or_insert_with(|| ChaCha20Rng::from_seed([0u8; 32]))
            .fill_bytes(dest);
        Ok(())
    }
}

impl<R: CryptoRngCore + ?Sized> CryptoRng for GuardedRng<'_, R> {}

#[cfg(test)]
mod tests {
    use rand_core::OsRng;

    use super::*;

    /// Succeeds `budget` times, then fails; panics if used through `fill_bytes`
    struct Budget(usize);

    impl RngCore for Budget {
        fn next_u32(&mut self) -> u32 {
            panic!("only try_fill_bytes may be used")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("only try_fill_bytes may be used")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("only try_fill_bytes may be used")
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
            if self.0 == 0 {
                return Err(Error::new("out of entropy"));
            }
            self.0 -= 1;
            dest.fill(0xa5);
            Ok(())
        }
    }

    impl CryptoRng for Budget {}

    #[test]
    fn test_passes_through_healthy_source() {
        let result = with_guarded_rng(&mut OsRng, |rng| {
            let mut buf = [0u8; 64];
            rng.fill_bytes(&mut buf);
            rng.next_u64();
            buf
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_records_first_failure_without_panicking() {
        let mut source = Budget(1);
        let mut guarded = GuardedRng::new(&mut source);

        let mut first = [0u8; 8];
        guarded.fill_bytes(&mut first);
        assert_eq!(first, [0xa5; 8]);
        assert!(!guarded.failed());

        let mut second = [0u8; 8];
        guarded.fill_bytes(&mut second);
        guarded.next_u32();
        assert!(guarded.failed());

        let err = guarded.finish().unwrap_err();
        assert!(err.to_string().contains("out of entropy"));
    }

    #[test]
    fn test_with_guarded_rng_discards_output_on_failure() {
        let result = with_guarded_rng(&mut Budget(0), |rng| rng.next_u64());
        assert!(result.is_err());
    }
}
