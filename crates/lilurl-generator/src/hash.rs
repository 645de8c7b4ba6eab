use crate::Generator;
use lilurl_core::{OwnerId, ShortCode};
use typed_builder::TypedBuilder;
use xxhash_rust::xxh64::Xxh64;

/// Number of hex digits in every generated code.
pub const CODE_WIDTH: usize = 16;

/// Derives a short code from a 64-bit xxHash of the original URL followed
/// by the owner id, rendered as fixed-width lowercase hex.
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct HashGenerator {
    #[builder(default)]
    seed: u64,
}

impl HashGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn digest(&self, original_url: &str, owner: &OwnerId) -> u64 {
        // Streaming both parts equals hashing their concatenation.
        let mut hasher = Xxh64::new(self.seed);
        hasher.update(original_url.as_bytes());
        hasher.update(owner.as_str().as_bytes());
        hasher.digest()
    }
}

impl Generator for HashGenerator {
    fn generate(&self, original_url: &str, owner: &OwnerId) -> ShortCode {
        let code = format!("{:0width$x}", self.digest(original_url, owner), width = CODE_WIDTH);
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xxhash_rust::xxh64::xxh64;

    fn owner(s: &str) -> OwnerId {
        OwnerId::new_unchecked(s)
    }

    #[test]
    fn same_input_same_code() {
        let generator = HashGenerator::new();
        let o = owner("67e55044-10b1-426f-9247-bb680e5fe0c8");

        let first = generator.generate("https://example.com", &o);
        let second = generator.generate("https://example.com", &o);
        assert_eq!(first, second);
    }

    #[test]
    fn matches_hash_of_concatenation() {
        let generator = HashGenerator::new();
        let o = owner("owner");

        let code = generator.generate("https://example.com", &o);
        let expected = format!("{:016x}", xxh64(b"https://example.comowner", 0));
        assert_eq!(code.as_str(), expected);
    }

    #[test]
    fn codes_are_fixed_width_hex_and_valid() {
        let generator = HashGenerator::new();
        for i in 0..64 {
            let code = generator.generate(&format!("https://example{}.com", i), &owner("o"));
            assert_eq!(code.as_str().len(), CODE_WIDTH);
            assert!(code.as_str().chars().all(|c| c.is_ascii_hexdigit()));
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn different_urls_give_different_codes() {
        let generator = HashGenerator::new();
        let o = owner("67e55044-10b1-426f-9247-bb680e5fe0c8");

        let a = generator.generate("https://example.com/a", &o);
        let b = generator.generate("https://example.com/b", &o);
        assert_ne!(a, b);
    }

    #[test]
    fn different_owners_give_different_codes() {
        let generator = HashGenerator::new();

        let a = generator.generate("https://example.com", &owner("owner-a"));
        let b = generator.generate("https://example.com", &owner("owner-b"));
        assert_ne!(a, b);
    }

    #[test]
    fn seed_changes_codes() {
        let plain = HashGenerator::new();
        let seeded = HashGenerator::builder().seed(42).build();
        assert_eq!(seeded.seed(), 42);

        let o = owner("o");
        assert_ne!(
            plain.generate("https://example.com", &o),
            seeded.generate("https://example.com", &o)
        );
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HashGenerator>();
    }
}
