//! Defines the authenticated encryption of [PlaintextMessage]s under a [MessageKey].
//!
//! A message is encoded as `[type tag][payload]` and sealed with a fresh random nonce.
//! Opening never returns data which failed authentication.
//! 
//! Last Moddified --- 2026-10-19

#[cfg(feature = "serde",)]
mod serde;

use crate::{key::MessageKey, message::PlaintextMessage, Error, Result,};
use clear_on_drop::ClearOnDrop;
use rand::{RngCore, CryptoRng,};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, NONCE_LEN,};
use std::io::{self, Write,};

/*
 * Definition of a serialised `Ciphertext`.
 * |-------Size - 28+ bytes------|
 * |nonce - 12 bytes             |
 * |data  - 16+ bytes            |
 * |-----------------------------|
 */

/// A trait for message encryption algorithms.
pub trait Algorithm {
  /// Returns the ring Algorithm instance.
  fn algorithm() -> &'static aead::Algorithm;
}

/// AES256 encryption in GCM mode.
pub struct Aes256Gcm;

impl Algorithm for Aes256Gcm {
  #[inline]
  fn algorithm() -> &'static aead::Algorithm { &aead::AES_256_GCM }
}

/// CHACHA20 encryption using Poly1305 authentication.
pub struct ChaCha20Poly1305;

impl Algorithm for ChaCha20Poly1305 {
  #[inline]
  fn algorithm() -> &'static aead::Algorithm { &aead::CHACHA20_POLY1305 }
}

/// A sealed message.
#[derive(PartialEq, Eq, Clone, Debug,)]
pub struct Ciphertext {
  /// The nonce the message was sealed with.
  pub nonce: [u8; NONCE_LEN],
  /// The encrypted message followed by its authentication tag.
  pub data: Box<[u8]>,
}

impl Ciphertext {
  /// The length of the nonce in bytes.
  pub const NONCE_LENGTH: usize = NONCE_LEN;

  /// Try to decode a `Ciphertext` from bytes.
  ///
  /// All of `bytes` is used; if there is not enough data for a nonce `None` is returned.
  ///
  /// # Params
  ///
  /// bytes --- The bytes to decode the ciphertext from.  
  pub fn deserialise(bytes: &[u8],) -> Option<Self> {
    if bytes.len() < NONCE_LEN { return None }

    let (nonce_bytes, data,) = bytes.split_at(NONCE_LEN,);
    let mut nonce = [0; NONCE_LEN];

    nonce.copy_from_slice(nonce_bytes,);

    Some(Self { nonce, data: data.into(), })
  }
  /// Encodes a `Ciphertext` as bytes.
  ///
  /// # Params
  ///
  /// writer --- The writer to write too.  
  pub fn serialise(&self, writer: &mut dyn Write,) -> io::Result<()> {
    writer.write_all(&self.nonce,)?;
    writer.write_all(&self.data,)
  }
  /// Encodes a `Ciphertext` into a new buffer.
  pub fn to_bytes(&self,) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(NONCE_LEN + self.data.len(),);

    bytes.extend_from_slice(&self.nonce,);
    bytes.extend_from_slice(&self.data,);
    bytes
  }
}

/// Creates the ring key for `key`.
fn ring_key<A,>(key: &MessageKey,) -> Option<LessSafeKey>
  where A: Algorithm, {
  UnboundKey::new(A::algorithm(), key.as_bytes(),).ok().map(LessSafeKey::new,)
}

/// Encrypts `plaintext` under `key` authenticating `aad` with it.
///
/// `key` must only ever seal one message.
///
/// # Params
///
/// rand --- The source of the nonce.  
/// key --- The message key.  
/// plaintext --- The message to seal.  
/// aad --- The associated data to authenticate.  
pub fn seal<A, Rand,>(rand: &mut Rand, key: &MessageKey, plaintext: &PlaintextMessage, aad: &[u8],) -> Result<Ciphertext>
  where A: Algorithm,
    Rand: RngCore + CryptoRng, {
  let algorithm = A::algorithm();
  let sealing_key = ring_key::<A,>(key,).ok_or(Error::Encryption,)?;
  let mut nonce = [0; NONCE_LEN];

  rand.fill_bytes(&mut nonce,);

  let mut data = Vec::with_capacity(plaintext.encoded_len() + algorithm.tag_len(),);

  plaintext.encode_into(&mut data,);

  if sealing_key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce,), Aad::from(aad,), &mut data,).is_err() {
    //Never leave the plaintext behind.
    ClearOnDrop::new(data.as_mut_slice(),);
    tracing::debug!(target: "double_ratchet_core::aead", length = plaintext.payload.len(), "failed to seal message");

    return Err(Error::Encryption)
  }

  tracing::trace!(target: "double_ratchet_core::aead", length = data.len(), "sealed message");

  Ok(Ciphertext { nonce, data: data.into_boxed_slice(), })
}

/// Decrypts `ciphertext` under `key` checking that it was sealed with `aad`.
///
/// # Params
///
/// key --- The message key.  
/// ciphertext --- The message to open.  
/// aad --- The associated data the message was sealed with.  
pub fn open<A,>(key: &MessageKey, ciphertext: &Ciphertext, aad: &[u8],) -> Result<PlaintextMessage>
  where A: Algorithm, {
  let opening_key = ring_key::<A,>(key,).ok_or(Error::AuthenticationFailure,)?;
  let mut data = ClearOnDrop::new(ciphertext.data.to_vec(),);
  let plaintext = match opening_key.open_in_place(Nonce::assume_unique_for_key(ciphertext.nonce,), Aad::from(aad,), &mut data[..],) {
    Ok(v) => v,
    Err(_) => {
      tracing::debug!(target: "double_ratchet_core::aead", length = ciphertext.data.len(), "ciphertext failed authentication");

      return Err(Error::AuthenticationFailure)
    },
  };

  tracing::trace!(target: "double_ratchet_core::aead", length = plaintext.len(), "opened message");

  PlaintextMessage::decode(plaintext,)
}

/// Encrypts `plaintext` under `key` using AES-256-GCM.
///
/// # Params
///
/// key --- The message key.  
/// plaintext --- The message to encrypt.  
#[inline]
pub fn encrypt(key: &MessageKey, plaintext: &PlaintextMessage,) -> Result<Ciphertext> {
  encrypt_with::<Aes256Gcm,>(key, plaintext,)
}

/// Encrypts `plaintext` under `key` using the algorithm `A`.
///
/// # Params
///
/// key --- The message key.  
/// plaintext --- The message to encrypt.  
#[inline]
pub fn encrypt_with<A,>(key: &MessageKey, plaintext: &PlaintextMessage,) -> Result<Ciphertext>
  where A: Algorithm, {
  seal::<A, _,>(&mut rand::thread_rng(), key, plaintext, &[],)
}

/// Decrypts `ciphertext` under `key` using AES-256-GCM.
///
/// # Params
///
/// key --- The message key.  
/// ciphertext --- The message to decrypt.  
#[inline]
pub fn decrypt(key: &MessageKey, ciphertext: &Ciphertext,) -> Result<PlaintextMessage> {
  decrypt_with::<Aes256Gcm,>(key, ciphertext,)
}

/// Decrypts `ciphertext` under `key` using the algorithm `A`.
///
/// # Params
///
/// key --- The message key.  
/// ciphertext --- The message to decrypt.  
#[inline]
pub fn decrypt_with<A,>(key: &MessageKey, ciphertext: &Ciphertext,) -> Result<PlaintextMessage>
  where A: Algorithm, {
  open::<A,>(key, ciphertext, &[],)
}

#[cfg(test,)]
mod tests {
  use super::*;
  use crate::{key::KEY_LENGTH, message::PlaintextMessageType,};

  /// Seals raw bytes which bypass the message encoding.
  fn seal_raw(key: &MessageKey, mut data: Vec<u8>,) -> Ciphertext {
    let nonce = [9; NONCE_LEN];

    ring_key::<Aes256Gcm,>(key,).expect("Error creating the key")
      .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce,), Aad::empty(), &mut data,)
      .expect("Error sealing raw data");

    Ciphertext { nonce, data: data.into_boxed_slice(), }
  }

  #[test]
  fn test_round_trip() {
    let key = MessageKey::from([1; KEY_LENGTH],);

    for &message_type in PlaintextMessageType::ALL.iter() {
      let message = PlaintextMessage::new(message_type, "test".as_bytes(),);
      let ciphertext = encrypt(&key, &message,).expect("Error encrypting message");

      assert_eq!(decrypt(&key, &ciphertext,), Ok(message), "Message decrypted incorrectly",);
    }

    let empty = PlaintextMessage::new(PlaintextMessageType::Error, Vec::<u8>::new(),);
    let ciphertext = encrypt(&key, &empty,).expect("Error encrypting empty message");
    assert_eq!(decrypt(&key, &ciphertext,), Ok(empty), "Empty message decrypted incorrectly",);

    let text = PlaintextMessage::text("Hello 世界 🌍",);
    let ciphertext = encrypt_with::<ChaCha20Poly1305,>(&key, &text,).expect("Error encrypting text");
    assert_eq!(decrypt_with::<ChaCha20Poly1305,>(&key, &ciphertext,), Ok(text), "Text decrypted incorrectly",);
  }
  #[test]
  fn test_ciphertext_hides_message() {
    let key1 = MessageKey::from([1; KEY_LENGTH],);
    let key2 = MessageKey::from([2; KEY_LENGTH],);
    let message = PlaintextMessage::text("Same message",);
    let ciphertext1 = encrypt(&key1, &message,).expect("Error encrypting first message");
    let ciphertext2 = encrypt(&key2, &message,).expect("Error encrypting second message");

    assert_ne!(ciphertext1.data, ciphertext2.data, "Different keys produced the same ciphertext",);
    assert!(
      !ciphertext1.data.windows(message.payload.len(),).any(|window,| window == &*message.payload,),
      "Ciphertext contains the plaintext",
    );
    assert_eq!(ciphertext1.data.len(), message.encoded_len() + Aes256Gcm::algorithm().tag_len(), "Unexpected ciphertext length",);
  }
  #[test]
  fn test_authentication_failure() {
    let key = MessageKey::from([1; KEY_LENGTH],);
    let message = PlaintextMessage::text("Hello",);
    let ciphertext = encrypt(&key, &message,).expect("Error encrypting message");

    assert_eq!(decrypt(&MessageKey::from([2; KEY_LENGTH],), &ciphertext,), Err(Error::AuthenticationFailure), "Opened with the wrong key",);

    let mut corrupted = ciphertext.clone();
    corrupted.data[0] ^= 1;
    assert_eq!(decrypt(&key, &corrupted,), Err(Error::AuthenticationFailure), "Opened corrupted data",);

    let mut corrupted = ciphertext.clone();
    corrupted.nonce[0] ^= 1;
    assert_eq!(decrypt(&key, &corrupted,), Err(Error::AuthenticationFailure), "Opened with a corrupted nonce",);

    let truncated = Ciphertext { data: ciphertext.data[..4].into(), ..ciphertext.clone() };
    assert_eq!(decrypt(&key, &truncated,), Err(Error::AuthenticationFailure), "Opened truncated data",);

    assert_eq!(
      open::<Aes256Gcm,>(&key, &seal::<Aes256Gcm, _,>(&mut rand::thread_rng(), &key, &message, b"header",).expect("Error sealing message"), b"other",),
      Err(Error::AuthenticationFailure),
      "Opened with the wrong associated data",
    );
    assert_eq!(decrypt_with::<ChaCha20Poly1305,>(&key, &ciphertext,), Err(Error::AuthenticationFailure), "Opened with the wrong algorithm",);
  }
  #[test]
  fn test_unknown_message_type() {
    let key = MessageKey::from([3; KEY_LENGTH],);

    assert_eq!(decrypt(&key, &seal_raw(&key, vec![0x00, 1, 2,],),), Err(Error::UnknownMessageType), "Opened an unknown tag",);
    assert_eq!(decrypt(&key, &seal_raw(&key, Vec::new(),),), Err(Error::UnknownMessageType), "Opened an empty plaintext",);
    assert_eq!(
      decrypt(&key, &seal_raw(&key, vec![b'D', 1, 2,],),),
      Ok(PlaintextMessage::new(PlaintextMessageType::Data, vec![1u8, 2,],)),
      "Raw data decoded incorrectly",
    );
  }
  #[test]
  fn test_ciphertext_serde() {
    const SERIALISED: [u8; NONCE_LEN + 4] = [
      1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
      1, 2, 3, 4,
    ];

    let ciphertext = Ciphertext { nonce: [1; NONCE_LEN], data: vec![1, 2, 3, 4,].into_boxed_slice(), };
    let mut bytes = [0; NONCE_LEN + 4];
    let writer = &mut bytes.as_mut();

    ciphertext.serialise(writer,)
      .expect("Error serialising the ciphertext");
    assert!(writer.is_empty(), "Serialisation did not write expected count",);
    assert_eq!(bytes, SERIALISED, "Ciphertext serialised incorrectly",);
    assert_eq!(ciphertext.to_bytes(), &SERIALISED[..], "Ciphertext encoded incorrectly",);

    let other = Ciphertext::deserialise(&bytes,)
      .expect("Error deserialising the ciphertext");
    assert_eq!(other, ciphertext, "Ciphertext deserialised incorrectly",);
    assert_eq!(Ciphertext::deserialise(&bytes[..NONCE_LEN - 1],), None, "Deserialised a short nonce",);
  }
}
