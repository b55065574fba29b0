//! Defines the [Session] which owns the live [RatchetState] of one end of a conversation.
//!
//! A `Session` advances its state after every message it locks or opens so no message key
//! is ever used twice. Both ends must lock and open messages in the same order.
//! 
//! Last Moddified --- 2026-10-19

use crate::{
  aead::{self, Algorithm, Aes256Gcm, Ciphertext,},
  agreement::KeyPair,
  message::PlaintextMessage,
  ratchet::{self, RatchetState,},
  Result,
};
use x25519_dalek::{PublicKey, StaticSecret,};
use std::marker::PhantomData;

/// One end of a double ratchet conversation.
///
/// Bare in mind that both ends must use the same `Algorithm`.
pub struct Session<Algorithm = Aes256Gcm,> {
  /// The live ratchet state.
  state: RatchetState,
  _algorithm: PhantomData<Algorithm>,
}

impl<A,> Session<A,>
  where A: Algorithm, {
  /// Starts a session with a remote party.
  ///
  /// # Params
  ///
  /// local_private_key --- The local long-term private key.  
  /// remote_public_key --- The remote long-term public key.  
  pub fn new(local_private_key: &StaticSecret, remote_public_key: &PublicKey,) -> Result<Self> {
    ratchet::initialize(local_private_key, remote_public_key,).map(Self::from_state,)
  }
  /// Resumes a session from a ratchet state.
  ///
  /// # Params
  ///
  /// state --- The live state of the session.  
  #[inline]
  pub fn from_state(state: RatchetState,) -> Self {
    Self { state, _algorithm: PhantomData, }
  }
  /// The live ratchet state.
  #[inline]
  pub fn state(&self,) -> &RatchetState { &self.state }
  /// Encrypts `message` under the current message key and advances the chain.
  ///
  /// # Params
  ///
  /// message --- The message to encrypt.  
  pub fn lock(&mut self, message: &PlaintextMessage,) -> Result<Ciphertext> {
    let ciphertext = aead::encrypt_with::<A,>(self.state.message_key(), message,)?;

    self.state = ratchet::ratchet_without_new_key(&self.state,);

    Ok(ciphertext)
  }
  /// Decrypts `ciphertext` under the current message key and advances the chain.
  ///
  /// On any error the state is left unchanged.
  ///
  /// # Params
  ///
  /// ciphertext --- The message to decrypt.  
  pub fn open(&mut self, ciphertext: &Ciphertext,) -> Result<PlaintextMessage> {
    let message = aead::decrypt_with::<A,>(self.state.message_key(), ciphertext,)?;

    self.state = ratchet::ratchet_without_new_key(&self.state,);

    Ok(message)
  }
  /// Performs a Diffie-Hellman ratchet step.
  ///
  /// If the step fails the state is left unchanged.
  ///
  /// # Params
  ///
  /// local_ephemeral_key_pair --- The new local ephemeral key pair.  
  /// remote_ephemeral_public_key --- The new remote ephemeral public key.  
  pub fn ratchet(&mut self, local_ephemeral_key_pair: KeyPair, remote_ephemeral_public_key: PublicKey,) -> Result<()> {
    self.state = ratchet::ratchet_with_new_key(&self.state, local_ephemeral_key_pair, remote_ephemeral_public_key,)?;

    Ok(())
  }
}

#[cfg(test,)]
mod tests {
  use super::*;
  use crate::{aead::ChaCha20Poly1305, message::PlaintextMessageType, Error,};
  use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN,};
  use std::convert::TryInto;

  fn sessions<A,>() -> (Session<A,>, Session<A,>,)
    where A: Algorithm, {
    let mut rand = rand::thread_rng();
    let alice = KeyPair::generate(&mut rand,);
    let bob = KeyPair::generate(&mut rand,);
    let alice_session = Session::new(&alice.private_key, &bob.public_key,)
      .expect("Error starting Alice's session");
    let bob_session = Session::new(&bob.private_key, &alice.public_key,)
      .expect("Error starting Bob's session");

    (alice_session, bob_session,)
  }

  #[test]
  fn test_session() {
    let (mut alice, mut bob,) = sessions::<Aes256Gcm,>();

    for text in ["First", "Second", "Third",].iter() {
      let message = PlaintextMessage::text(text,);
      let ciphertext = alice.lock(&message,).expect("Error locking message");

      assert_eq!(bob.open(&ciphertext,), Ok(message), "Message opened incorrectly",);
    }

    let message = PlaintextMessage::new(PlaintextMessageType::Data, vec![0u8; 100],);
    let ciphertext = bob.lock(&message,).expect("Error locking reply");

    assert_eq!(alice.open(&ciphertext,), Ok(message), "Reply opened incorrectly",);
    assert_eq!(alice.state().message_key(), bob.state().message_key(), "Chains diverged",);

    let resumed = Session::<Aes256Gcm,>::from_state(bob.state().clone(),);
    assert_eq!(resumed.state(), bob.state(), "Resumed state differs",);
  }
  #[test]
  fn test_session_recovery() {
    let (mut alice, mut bob,) = sessions::<ChaCha20Poly1305,>();
    let message = PlaintextMessage::text("Hello",);
    let ciphertext = alice.lock(&message,).expect("Error locking message");
    let before = bob.state().clone();
    let mut corrupted = ciphertext.clone();

    corrupted.data[0] ^= 1;

    assert_eq!(bob.open(&corrupted,), Err(Error::AuthenticationFailure), "Opened a corrupted message",);
    assert_eq!(bob.state(), &before, "Failed open changed the state",);
    assert_eq!(bob.open(&ciphertext,), Ok(message), "Error opening message after recovery",);
    assert_eq!(bob.open(&ciphertext,), Err(Error::AuthenticationFailure), "Opened a message twice",);
  }
  #[test]
  fn test_session_ratchet() {
    let (mut alice, mut bob,) = sessions::<Aes256Gcm,>();
    let mut rand = rand::thread_rng();
    let alice_ephemeral = KeyPair::generate(&mut rand,);
    let bob_ephemeral = KeyPair::generate(&mut rand,);

    //Alice announces her new public key.
    let announcement = PlaintextMessage::new(PlaintextMessageType::Ratchet, &alice_ephemeral.public_key.as_bytes()[..],);
    let ciphertext = alice.lock(&announcement,).expect("Error locking Alice's announcement");
    let received = bob.open(&ciphertext,).expect("Error opening Alice's announcement");
    let alice_public: [u8; 32] = received.payload[..].try_into().expect("Announcement was not a public key");

    //Bob answers with his.
    let announcement = PlaintextMessage::new(PlaintextMessageType::Ratchet, &bob_ephemeral.public_key.as_bytes()[..],);
    let ciphertext = bob.lock(&announcement,).expect("Error locking Bob's announcement");
    let received = alice.open(&ciphertext,).expect("Error opening Bob's announcement");
    let bob_public: [u8; 32] = received.payload[..].try_into().expect("Announcement was not a public key");

    let old_root = alice.state().root_key().clone();

    alice.ratchet(alice_ephemeral, bob_public.into(),).expect("Error ratcheting Alice");
    bob.ratchet(bob_ephemeral, alice_public.into(),).expect("Error ratcheting Bob");
    assert_ne!(alice.state().root_key(), &old_root, "Root key did not change",);
    assert_eq!(alice.state().root_key(), bob.state().root_key(), "Root keys diverged",);

    let message = PlaintextMessage::text("After the step",);
    let ciphertext = alice.lock(&message,).expect("Error locking message");

    assert_eq!(bob.open(&ciphertext,), Ok(message), "Message opened incorrectly",);

    let before = bob.state().clone();

    bob.ratchet(KeyPair::generate(&mut rand,), PublicKey::from([0; 32],),)
      .expect_err("Ratcheted with a low order public key");
    assert_eq!(bob.state(), &before, "Failed ratchet changed the state",);
  }
  #[test]
  fn test_session_unknown_message_type() {
    let (mut alice, mut bob,) = sessions::<Aes256Gcm,>();
    let key = LessSafeKey::new(
      UnboundKey::new(&AES_256_GCM, bob.state().message_key().as_bytes(),)
        .expect("Error creating the ring key"),
    );
    let nonce = [7; NONCE_LEN];
    let mut data = vec![0u8, 1, 2,];

    key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce,), Aad::empty(), &mut data,)
      .expect("Error sealing raw data");

    let before = bob.state().clone();
    let unknown = Ciphertext { nonce, data: data.into_boxed_slice(), };

    assert_eq!(bob.open(&unknown,), Err(Error::UnknownMessageType), "Opened an unknown message type",);
    assert_eq!(bob.state(), &before, "Unknown message type changed the state",);

    let message = PlaintextMessage::text("Still in step",);
    let ciphertext = alice.lock(&message,).expect("Error locking message");

    assert_eq!(bob.open(&ciphertext,), Ok(message), "Error opening message after an unknown type",);
  }
}
