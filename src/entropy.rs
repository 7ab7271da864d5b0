use rand::rngs::OsRng;
use rand::RngCore;

/// Source of secret key material.
pub trait SecretSource {
    fn fill(&self, dest: &mut [u8]);
}

/// Operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSecretSource;

impl SecretSource for OsSecretSource {
    fn fill(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Repeats a fixed byte pattern. Only meant for tests.
#[derive(Clone, Debug)]
pub struct FixedSecretSource(pub Vec<u8>);

impl SecretSource for FixedSecretSource {
    fn fill(&self, dest: &mut [u8]) {
        if self.0.is_empty() {
            dest.fill(0);
            return;
        }
        for (byte, src) in dest.iter_mut().zip(self.0.iter().cycle()) {
            *byte = *src;
        }
    }
}

impl<T: SecretSource + ?Sized> SecretSource for std::sync::Arc<T> {
    fn fill(&self, dest: &mut [u8]) {
        (**self).fill(dest)
    }
}
