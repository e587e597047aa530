//! Opaque pagination cursors.
//!
//! A cursor carries the identifier of the last contact returned on the
//! previous page. The identifier is written as decimal text, encrypted with a
//! server-held AES key under a fresh random IV, prefixed with that IV and
//! rendered as padded base64url. Encoding the same identifier twice yields
//! two different strings; only the decoded values are comparable.
//!
//! Two schemes are supported:
//!
//! * [`CursorScheme::Stream`]: AES-CTR with a 16-byte IV. No integrity tag, so
//!   a flipped byte may decode to a different identifier. The decoded value is
//!   only ever used as an owner-scoped lower bound.
//! * [`CursorScheme::Authenticated`]: AES-GCM with a 12-byte nonce. Any
//!   modification is rejected.
//!
//! Decoding never panics: every failure is a [`CursorError::InvalidCursor`].

mod errors;

pub use errors::CursorError;

use std::fmt;

use aes_gcm::{
    AesGcm, KeyInit,
    aead::{self, Aead, consts::U12},
    aes::{Aes128, Aes192, Aes256},
};
use base64ct::{Base64Url, Encoding};
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::Result;
use crate::config::ConfigError;
use crate::constants::{CURSOR_KEY_LENGTHS, MAX_CONTACT_ID};

/// IV length for AES-CTR (one AES block)
pub const IV_LENGTH: usize = 16;

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Longest cursor string accepted before any decoding work is done.
pub const MAX_CURSOR_LENGTH: usize = 256;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes192Ctr = ctr::Ctr128BE<Aes192>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

type Aes128Gcm = AesGcm<Aes128, U12>;
type Aes192Gcm = AesGcm<Aes192, U12>;
type Aes256Gcm = AesGcm<Aes256, U12>;

/// Encryption scheme used for cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorScheme {
    /// AES-CTR, unauthenticated.
    #[default]
    Stream,
    /// AES-GCM, tampering is detected.
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

/// Encodes and decodes opaque pagination cursors.
///
/// The codec is immutable after construction and can be shared freely
/// between concurrent requests.
#[derive(Clone)]
pub struct CursorCodec {
    key: Zeroizing<Vec<u8>>,
    key_size: KeySize,
    scheme: CursorScheme,
}

impl fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorCodec")
            .field("key", &"<redacted>")
            .field("key_size", &self.key_size)
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl CursorCodec {
    /// Create a codec keyed by `secret`.
    ///
    /// The secret bytes are the AES key and must be 16, 24 or 32 bytes long.
    pub fn new(secret: impl AsRef<[u8]>, scheme: CursorScheme) -> Result<Self> {
        let secret = secret.as_ref();
        let key_size = match secret.len() {
            16 => KeySize::Aes128,
            24 => KeySize::Aes192,
            32 => KeySize::Aes256,
            actual => {
                return Err(ConfigError::InvalidSecretLength {
                    expected: CURSOR_KEY_LENGTHS.to_vec(),
                    actual,
                }
                .into());
            }
        };

        Ok(Self {
            key: Zeroizing::new(secret.to_vec()),
            key_size,
            scheme,
        })
    }

    /// The scheme this codec encrypts with.
    pub fn scheme(&self) -> CursorScheme {
        self.scheme
    }

    /// Encode the identifier of the last returned record as a cursor.
    pub fn encode(&self, last_id: u64) -> Result<String> {
        if last_id > MAX_CONTACT_ID {
            return Err(CursorError::UnencodableId { id: last_id }.into());
        }

        let sealed = self.seal(last_id.to_string().as_bytes())?;
        Ok(Base64Url::encode_string(&sealed))
    }

    /// Decode a cursor produced by [`encode`](Self::encode).
    ///
    /// An empty cursor means "start from the beginning" and yields `None`.
    pub fn decode(&self, cursor: &str) -> Result<Option<u64>> {
        if cursor.is_empty() {
            return Ok(None);
        }

        if cursor.len() > MAX_CURSOR_LENGTH {
            return Err(CursorError::invalid(format!(
                "cursor exceeds {MAX_CURSOR_LENGTH} characters"
            ))
            .into());
        }

        let sealed = Base64Url::decode_vec(cursor)
            .map_err(|e| CursorError::invalid(format!("not base64url: {e}")))?;

        let plaintext = Zeroizing::new(self.open(&sealed)?);
        let id = parse_id(&plaintext)?;

        Ok(Some(id))
    }

    /// Encrypt a payload and prefix it with a fresh IV or nonce.
    fn seal(&self, plaintext: &[u8]) -> std::result::Result<Vec<u8>, CursorError> {
        match self.scheme {
            CursorScheme::Stream => {
                let mut sealed = vec![0u8; IV_LENGTH + plaintext.len()];
                let (iv, body) = sealed.split_at_mut(IV_LENGTH);
                OsRng.fill_bytes(iv);
                body.copy_from_slice(plaintext);

                match self.key_size {
                    KeySize::Aes128 => apply_keystream::<Aes128Ctr>(&self.key, iv, body),
                    KeySize::Aes192 => apply_keystream::<Aes192Ctr>(&self.key, iv, body),
                    KeySize::Aes256 => apply_keystream::<Aes256Ctr>(&self.key, iv, body),
                }
                .map_err(|reason| CursorError::EncryptionFailed { reason })?;

                Ok(sealed)
            }
            CursorScheme::Authenticated => {
                let mut nonce = [0u8; NONCE_LENGTH];
                OsRng.fill_bytes(&mut nonce);

                let ciphertext = match self.key_size {
                    KeySize::Aes128 => seal_aead::<Aes128Gcm>(&self.key, &nonce, plaintext),
                    KeySize::Aes192 => seal_aead::<Aes192Gcm>(&self.key, &nonce, plaintext),
                    KeySize::Aes256 => seal_aead::<Aes256Gcm>(&self.key, &nonce, plaintext),
                }
                .map_err(|reason| CursorError::EncryptionFailed { reason })?;

                let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
                sealed.extend_from_slice(&nonce);
                sealed.extend_from_slice(&ciphertext);
                Ok(sealed)
            }
        }
    }

    /// Split the IV or nonce from a sealed payload and decrypt it.
    fn open(&self, sealed: &[u8]) -> std::result::Result<Vec<u8>, CursorError> {
        match self.scheme {
            CursorScheme::Stream => {
                if sealed.len() < IV_LENGTH {
                    return Err(CursorError::invalid("shorter than one cipher block"));
                }
                let (iv, body) = sealed.split_at(IV_LENGTH);
                let mut plaintext = body.to_vec();

                match self.key_size {
                    KeySize::Aes128 => apply_keystream::<Aes128Ctr>(&self.key, iv, &mut plaintext),
                    KeySize::Aes192 => apply_keystream::<Aes192Ctr>(&self.key, iv, &mut plaintext),
                    KeySize::Aes256 => apply_keystream::<Aes256Ctr>(&self.key, iv, &mut plaintext),
                }
                .map_err(CursorError::invalid)?;

                Ok(plaintext)
            }
            CursorScheme::Authenticated => {
                if sealed.len() < NONCE_LENGTH {
                    return Err(CursorError::invalid("shorter than one nonce"));
                }
                let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);

                match self.key_size {
                    KeySize::Aes128 => open_aead::<Aes128Gcm>(&self.key, nonce, ciphertext),
                    KeySize::Aes192 => open_aead::<Aes192Gcm>(&self.key, nonce, ciphertext),
                    KeySize::Aes256 => open_aead::<Aes256Gcm>(&self.key, nonce, ciphertext),
                }
                .map_err(CursorError::invalid)
            }
        }
    }
}

fn apply_keystream<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> std::result::Result<(), String>
where
    C: KeyIvInit + StreamCipher,
{
    let mut cipher =
        C::new_from_slices(key, iv).map_err(|e| format!("Failed to create cipher: {e}"))?;
    cipher
        .try_apply_keystream(buf)
        .map_err(|e| format!("Keystream exhausted: {e}"))
}

fn seal_aead<C>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> std::result::Result<Vec<u8>, String>
where
    C: KeyInit + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|e| format!("Failed to create cipher: {e}"))?;
    cipher
        .encrypt(aead::Nonce::<C>::from_slice(nonce), plaintext)
        .map_err(|e| format!("Encryption failed: {e}"))
}

fn open_aead<C>(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> std::result::Result<Vec<u8>, String>
where
    C: KeyInit + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|e| format!("Failed to create cipher: {e}"))?;
    cipher
        .decrypt(aead::Nonce::<C>::from_slice(nonce), ciphertext)
        .map_err(|_| "authentication tag mismatch".to_string())
}

/// Parse decrypted cursor text as a plain decimal identifier.
fn parse_id(plaintext: &[u8]) -> std::result::Result<u64, CursorError> {
    if plaintext.is_empty() || !plaintext.iter().all(u8::is_ascii_digit) {
        return Err(CursorError::invalid("payload is not a decimal identifier"));
    }

    // Digits only, so the text is valid UTF-8.
    let text = std::str::from_utf8(plaintext)
        .map_err(|_| CursorError::invalid("payload is not valid UTF-8"))?;
    let id: u64 = text
        .parse()
        .map_err(|_| CursorError::invalid("identifier out of range"))?;

    if id > MAX_CONTACT_ID {
        return Err(CursorError::invalid("identifier out of range"));
    }

    Ok(id)
}
