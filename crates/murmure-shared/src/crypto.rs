use std::sync::OnceLock;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;

use crate::constants::{BLOCK_SIZE, KEY_SIZE};
use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub type SymmetricKey = [u8; KEY_SIZE];

static PROVIDER: OnceLock<Result<CryptoProvider, CryptoError>> = OnceLock::new();

/// Process-wide cryptographic entry point.
///
/// Initialised exactly once per process via [`CryptoProvider::global`],
/// which probes the OS entropy source before handing out the provider.
/// Every [`CryptoEngine`] takes the provider at construction time, so
/// nothing can encrypt before the probe has passed.
pub struct CryptoProvider {
    _private: (),
}

impl CryptoProvider {
    /// Idempotent one-time initialisation. A failed probe is fatal and
    /// is returned again on every subsequent call.
    pub fn global() -> Result<&'static CryptoProvider, CryptoError> {
        PROVIDER
            .get_or_init(Self::probe)
            .as_ref()
            .map_err(|e| e.clone())
    }

    fn probe() -> Result<CryptoProvider, CryptoError> {
        let mut a = [0u8; KEY_SIZE];
        let mut b = [0u8; KEY_SIZE];
        rand::rngs::OsRng
            .try_fill_bytes(&mut a)
            .map_err(|_| CryptoError::EntropyFailure)?;
        rand::rngs::OsRng
            .try_fill_bytes(&mut b)
            .map_err(|_| CryptoError::EntropyFailure)?;
        // Two identical samples means the source is not producing randomness.
        if a == b {
            return Err(CryptoError::EntropyFailure);
        }
        Ok(CryptoProvider { _private: () })
    }

    /// Fresh 256-bit symmetric key.
    pub fn generate_key(&self) -> SymmetricKey {
        let mut key = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut key);
        key
    }

    // Never cached: a repeated IV under the same key breaks CBC
    // confidentiality.
    fn generate_iv(&self) -> [u8; BLOCK_SIZE] {
        let mut iv = [0u8; BLOCK_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        iv
    }
}

/// Symmetric cipher bound to one session key.
///
/// The key lives only as long as the engine and is never persisted.
pub struct CryptoEngine {
    provider: &'static CryptoProvider,
    key: SymmetricKey,
}

impl CryptoEngine {
    pub fn new(provider: &'static CryptoProvider, key: SymmetricKey) -> Self {
        Self { provider, key }
    }

    /// Encrypt `plaintext` with a fresh random IV.
    /// Returns `IV || ciphertext` (16-byte IV prepended).
    pub fn encrypt(&self, plaintext: &str) -> Vec<u8> {
        let iv = self.provider.generate_iv();
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut output = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        output.extend_from_slice(&iv);
        output.extend_from_slice(&ciphertext);
        output
    }

    /// Decrypt an `IV || ciphertext` payload produced by [`encrypt`].
    ///
    /// Never panics: malformed input of any shape comes back as a
    /// [`CryptoError`] so one bad entry cannot take down a snapshot pass.
    ///
    /// [`encrypt`]: CryptoEngine::encrypt
    pub fn decrypt(&self, payload: &[u8]) -> Result<String, CryptoError> {
        // Shortest valid payload: IV plus one padded block.
        if payload.len() < BLOCK_SIZE * 2 {
            return Err(CryptoError::PayloadTooShort);
        }
        let (iv, ciphertext) = payload.split_at(BLOCK_SIZE);
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::NotBlockAligned);
        }

        let mut iv_arr = [0u8; BLOCK_SIZE];
        iv_arr.copy_from_slice(iv);

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv_arr.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::InvalidPadding)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::NotText)
    }

    /// Short BLAKE3 fingerprint of the session key, safe to log.
    pub fn key_fingerprint(&self) -> String {
        let hash = blake3::hash(&self.key);
        hex::encode(&hash.as_bytes()[..8])
    }
}

/// Standard base64, no line wrapping: the on-the-wire form of a payload.
pub fn encode_payload(payload: &[u8]) -> String {
    BASE64.encode(payload)
}

pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(encoded)
        .map_err(|e| CryptoError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CryptoEngine {
        let provider = CryptoProvider::global().unwrap();
        CryptoEngine::new(provider, provider.generate_key())
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let engine = engine();
        let plaintext = "Bonjour, Murmure!";

        let payload = engine.encrypt(plaintext);
        let decrypted = engine.decrypt(&payload).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_roundtrip_empty_string() {
        let engine = engine();
        let payload = engine.encrypt("");
        assert_eq!(engine.decrypt(&payload).unwrap(), "");
    }

    #[test]
    fn test_roundtrip_multibyte_text() {
        let engine = engine();
        let plaintext = "héllo wörld 🔐";
        let payload = engine.encrypt(plaintext);
        assert_eq!(engine.decrypt(&payload).unwrap(), plaintext);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let engine = engine();
        let a = engine.encrypt("same plaintext");
        let b = engine.encrypt("same plaintext");

        // Same key, same plaintext, different IV, different ciphertext.
        assert_ne!(a, b);
        assert_ne!(a[..BLOCK_SIZE], b[..BLOCK_SIZE]);
    }

    #[test]
    fn test_iv_prefix_length() {
        let engine = engine();
        let payload = engine.encrypt("x");
        // IV (16) + one padded block (16).
        assert_eq!(payload.len(), BLOCK_SIZE * 2);
    }

    #[test]
    fn test_short_payload_fails() {
        let engine = engine();
        assert_eq!(engine.decrypt(&[]), Err(CryptoError::PayloadTooShort));
        assert_eq!(
            engine.decrypt(&[0u8; BLOCK_SIZE]),
            Err(CryptoError::PayloadTooShort)
        );
    }

    #[test]
    fn test_misaligned_payload_fails() {
        let engine = engine();
        assert_eq!(
            engine.decrypt(&[0u8; BLOCK_SIZE * 2 + 3]),
            Err(CryptoError::NotBlockAligned)
        );
    }

    #[test]
    fn test_non_utf8_plaintext_fails() {
        let provider = CryptoProvider::global().unwrap();
        let key = provider.generate_key();
        let engine = CryptoEngine::new(provider, key);

        // Encrypt invalid UTF-8 with the raw primitives, then feed the
        // payload through the engine.
        let iv = [7u8; BLOCK_SIZE];
        let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&[0xff, 0xfe, 0xfd]);
        let mut payload = iv.to_vec();
        payload.extend_from_slice(&ciphertext);

        assert_eq!(engine.decrypt(&payload), Err(CryptoError::NotText));
    }

    #[test]
    fn test_provider_is_singleton() {
        let a = CryptoProvider::global().unwrap() as *const CryptoProvider;
        let b = CryptoProvider::global().unwrap() as *const CryptoProvider;
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_keys_differ() {
        let provider = CryptoProvider::global().unwrap();
        assert_ne!(provider.generate_key(), provider.generate_key());
    }

    #[test]
    fn test_base64_roundtrip() {
        let payload = vec![0u8, 1, 2, 250, 251, 252];
        let encoded = encode_payload(&payload);
        assert!(!encoded.contains('\n'));
        assert_eq!(decode_payload(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_base64_rejects_garbage() {
        assert!(matches!(
            decode_payload("not base64!!"),
            Err(CryptoError::Encoding(_))
        ));
    }

    #[test]
    fn test_key_fingerprint_is_not_the_key() {
        let engine = engine();
        let fp = engine.key_fingerprint();
        assert_eq!(fp.len(), 16);
        assert!(!hex::encode(engine.key).contains(&fp));
    }
}
