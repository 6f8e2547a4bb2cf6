//! HMAC-SHA256 password derivation
//!
//! The secret keys an HMAC over a length-prefixed encoding of
//! `(version, platform, account)`. Output blocks are produced by appending a
//! big-endian block counter, and characters are drawn from the stream with
//! rejection sampling so every alphabet position is equally likely.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{normalize_platform, Derivation, DerivationInput};
use crate::error::DerivationError;

type HmacSha256 = Hmac<Sha256>;

const DOMAIN_TAG: &[u8] = b"kpwgen/v1";

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";

/// Characters between prefix and suffix; one per character class
const MIN_BODY_CHARS: usize = 4;

/// Upper bound on the target length
const MAX_TARGET_LENGTH: usize = 256;

/// HMAC-SHA256 implementation of the derivation primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacDerivation;

impl HmacDerivation {
    pub fn new() -> Self {
        Self
    }
}

impl Derivation for HmacDerivation {
    fn normalize(&self, platform: &str) -> String {
        normalize_platform(platform)
    }

    fn generate(&self, input: &DerivationInput<'_>) -> Result<String, DerivationError> {
        if input.version == 0 {
            return Err(DerivationError::InvalidVersion);
        }

        let platform = if input.normalize {
            self.normalize(input.platform)
        } else {
            input.platform.trim().to_string()
        };
        if platform.is_empty() {
            return Err(DerivationError::EmptyPlatform);
        }

        let fixed = input.prefix.chars().count() + input.suffix.chars().count();
        let minimum = fixed + MIN_BODY_CHARS;
        if input.target_length < minimum {
            return Err(DerivationError::LengthTooShort {
                length: input.target_length,
                minimum,
            });
        }
        if input.target_length > MAX_TARGET_LENGTH {
            return Err(DerivationError::LengthTooLong {
                length: input.target_length,
                maximum: MAX_TARGET_LENGTH,
            });
        }

        let mut mac = HmacSha256::new_from_slice(input.secret.expose().as_bytes())
            .map_err(|_| DerivationError::InvalidKey)?;
        mac.update(DOMAIN_TAG);
        mac.update(&input.version.to_be_bytes());
        update_field(&mut mac, platform.as_bytes());
        update_field(&mut mac, input.account.unwrap_or("").as_bytes());

        let mut stream = KeyStream::new(mac);
        let body = derive_body(&mut stream, input.target_length - fixed);

        let mut password = String::with_capacity(input.target_length);
        password.push_str(input.prefix);
        password.extend(body.into_iter().map(char::from));
        password.push_str(input.suffix);
        Ok(password)
    }
}

fn update_field(mac: &mut HmacSha256, field: &[u8]) {
    mac.update(&(field.len() as u32).to_be_bytes());
    mac.update(field);
}

fn derive_body(stream: &mut KeyStream, len: usize) -> Vec<u8> {
    let mut body = Vec::with_capacity(len);
    for class in [UPPER, LOWER, DIGITS, SYMBOLS] {
        body.push(class[stream.pick(class.len())]);
    }

    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();
    while body.len() < len {
        body.push(all[stream.pick(all.len())]);
    }

    // Fisher-Yates so the guaranteed classes don't always lead
    for i in (1..body.len()).rev() {
        let j = stream.pick(i + 1);
        body.swap(i, j);
    }
    body
}

/// Unbounded byte stream of HMAC output blocks
struct KeyStream {
    base: HmacSha256,
    counter: u32,
    block: Vec<u8>,
    pos: usize,
}

impl KeyStream {
    fn new(base: HmacSha256) -> Self {
        Self {
            base,
            counter: 0,
            block: Vec::new(),
            pos: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos >= self.block.len() {
            let mut mac = self.base.clone();
            mac.update(&self.counter.to_be_bytes());
            self.block = mac.finalize().into_bytes().to_vec();
            self.counter = self.counter.wrapping_add(1);
            self.pos = 0;
        }
        let byte = self.block[self.pos];
        self.pos += 1;
        byte
    }

    /// Uniform index in `0..n` (n <= 256)
    fn pick(&mut self, n: usize) -> usize {
        let limit = 256 - (256 % n);
        loop {
            let byte = self.next_byte() as usize;
            if byte < limit {
                return byte % n;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::MasterSecret;

    fn input<'a>(secret: &'a MasterSecret, platform: &'a str) -> DerivationInput<'a> {
        DerivationInput {
            secret,
            platform,
            account: None,
            version: 1,
            target_length: 18,
            prefix: "Qx9",
            suffix: "K7",
            normalize: true,
        }
    }

    #[test]
    fn test_deterministic() {
        let secret = MasterSecret::from("correct horse battery");
        let derivation = HmacDerivation::new();

        let first = derivation.generate(&input(&secret, "google")).unwrap();
        let second = derivation.generate(&input(&secret, "google")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shape() {
        let secret = MasterSecret::from("correct horse battery");
        let password = HmacDerivation.generate(&input(&secret, "google")).unwrap();

        assert_eq!(password.chars().count(), 18);
        assert!(password.starts_with("Qx9"));
        assert!(password.ends_with("K7"));

        let body = &password[3..password.len() - 2];
        assert!(body.bytes().any(|b| UPPER.contains(&b)));
        assert!(body.bytes().any(|b| LOWER.contains(&b)));
        assert!(body.bytes().any(|b| DIGITS.contains(&b)));
        assert!(body.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_inputs_change_output() {
        let secret = MasterSecret::from("correct horse battery");
        let other_secret = MasterSecret::from("correct horse battery!");
        let base = HmacDerivation.generate(&input(&secret, "google")).unwrap();

        let other_platform = HmacDerivation.generate(&input(&secret, "github")).unwrap();
        assert_ne!(base, other_platform);

        let other_key = HmacDerivation.generate(&input(&other_secret, "google")).unwrap();
        assert_ne!(base, other_key);

        let mut rotated = input(&secret, "google");
        rotated.version = 2;
        assert_ne!(base, HmacDerivation.generate(&rotated).unwrap());

        let mut with_account = input(&secret, "google");
        with_account.account = Some("alice");
        assert_ne!(base, HmacDerivation.generate(&with_account).unwrap());
    }

    #[test]
    fn test_normalize_flag_canonicalizes_platform() {
        let secret = MasterSecret::from("correct horse battery");
        let canonical = HmacDerivation.generate(&input(&secret, "google")).unwrap();
        let from_url = HmacDerivation
            .generate(&input(&secret, "https://accounts.google.com"))
            .unwrap();
        assert_eq!(canonical, from_url);

        let mut raw = input(&secret, "https://accounts.google.com");
        raw.normalize = false;
        assert_ne!(canonical, HmacDerivation.generate(&raw).unwrap());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let secret = MasterSecret::from("correct horse battery");

        let mut zero_version = input(&secret, "google");
        zero_version.version = 0;
        assert_eq!(
            HmacDerivation.generate(&zero_version),
            Err(DerivationError::InvalidVersion)
        );

        assert_eq!(
            HmacDerivation.generate(&input(&secret, "!!!")),
            Err(DerivationError::EmptyPlatform)
        );

        let mut short = input(&secret, "google");
        short.target_length = 8;
        assert_eq!(
            HmacDerivation.generate(&short),
            Err(DerivationError::LengthTooShort { length: 8, minimum: 9 })
        );

        let mut long = input(&secret, "google");
        long.target_length = 300;
        assert!(matches!(
            HmacDerivation.generate(&long),
            Err(DerivationError::LengthTooLong { .. })
        ));
    }

    #[test]
    fn test_long_password_spans_blocks() {
        let secret = MasterSecret::from("correct horse battery");
        let mut long = input(&secret, "google");
        long.target_length = 200;
        let password = HmacDerivation.generate(&long).unwrap();
        assert_eq!(password.len(), 200);
    }
}
