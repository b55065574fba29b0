//! Defines the [RatchetState] and the ratchet state transitions.
//!
//! Every transition takes a state by reference and returns a new state; a state is never
//! modified in place. A superseded state can still be read (e.g. to decrypt a message
//! locked under its message key) but must not be ratcheted again.
//! 
//! Last Moddified --- 2026-10-19

use crate::{
  agreement::{self, KeyPair,},
  key::{RootKey, ChainKey, SharedKey, MessageKey,},
  kdf, Result,
};
use rand::{RngCore, CryptoRng,};
use x25519_dalek::{PublicKey, StaticSecret,};

/// A snapshot of one end of a double ratchet session.
#[derive(PartialEq, Eq, Clone, Debug,)]
pub struct RatchetState {
  /// The current root key.
  root_key: RootKey,
  /// The current chain key.
  chain_key: ChainKey,
  /// The shared key of the last key agreement.
  shared_key: SharedKey,
  /// The key for the current message.
  message_key: MessageKey,
  /// The local key pair for the next Diffie-Hellman step.
  local_ephemeral_key_pair: KeyPair,
  /// The remote public key of the last Diffie-Hellman step.
  remote_ephemeral_public_key: PublicKey,
}

impl RatchetState {
  /// The current root key.
  #[inline]
  pub fn root_key(&self,) -> &RootKey { &self.root_key }
  /// The current chain key.
  #[inline]
  pub fn chain_key(&self,) -> &ChainKey { &self.chain_key }
  /// The shared key of the last key agreement.
  #[inline]
  pub fn shared_key(&self,) -> &SharedKey { &self.shared_key }
  /// The key to lock or open the current message with.
  #[inline]
  pub fn message_key(&self,) -> &MessageKey { &self.message_key }
  /// The local ephemeral key pair.
  #[inline]
  pub fn local_ephemeral_key_pair(&self,) -> &KeyPair { &self.local_ephemeral_key_pair }
  /// The remote ephemeral public key.
  ///
  /// Until the first Diffie-Hellman step this is the remote long-term public key.
  #[inline]
  pub fn remote_ephemeral_public_key(&self,) -> &PublicKey { &self.remote_ephemeral_public_key }
}

/// Creates the initial state of a session.
///
/// Both parties derive the same root, chain and message keys because the key agreement of
/// their long-term keys commutes. Each party generates its own ephemeral key pair.
///
/// # Params
///
/// local_private_key --- The local long-term private key.  
/// remote_public_key --- The remote long-term public key.  
#[inline]
pub fn initialize(local_private_key: &StaticSecret, remote_public_key: &PublicKey,) -> Result<RatchetState> {
  initialize_with_rng(&mut rand::thread_rng(), local_private_key, remote_public_key,)
}

/// Creates the initial state of a session drawing the ephemeral key pair from `rand`.
///
/// # Params
///
/// rand --- The source of randomness for the ephemeral key pair.  
/// local_private_key --- The local long-term private key.  
/// remote_public_key --- The remote long-term public key.  
pub fn initialize_with_rng<Rand,>(rand: &mut Rand, local_private_key: &StaticSecret, remote_public_key: &PublicKey,) -> Result<RatchetState>
  where Rand: RngCore + CryptoRng, {
  let local_ephemeral_key_pair = KeyPair::generate(rand,);
  //The ephemeral key is kept for the next step, only the long-term keys seed the session.
  let shared_key = agreement::shared_secret(local_private_key, remote_public_key,)?;
  let root_key = kdf::initial_root(&shared_key,);
  let (chain_key, message_key,) = kdf::initial_chain(&root_key,);

  tracing::debug!(target: "double_ratchet_core::ratchet", "initialized ratchet state");

  Ok(RatchetState {
    root_key,
    chain_key,
    shared_key,
    message_key,
    local_ephemeral_key_pair,
    remote_ephemeral_public_key: *remote_public_key,
  })
}

/// Performs a Diffie-Hellman ratchet step.
///
/// The root key is mixed with the agreement of the new ephemeral keys and the new chain is
/// advanced once so the returned state has a usable message key.
///
/// # Params
///
/// old_state --- The state to advance.  
/// local_ephemeral_key_pair --- The new local ephemeral key pair.  
/// remote_ephemeral_public_key --- The new remote ephemeral public key.  
pub fn ratchet_with_new_key(
  old_state: &RatchetState,
  local_ephemeral_key_pair: KeyPair,
  remote_ephemeral_public_key: PublicKey,
) -> Result<RatchetState> {
  let shared_key = local_ephemeral_key_pair.shared_secret(&remote_ephemeral_public_key,)?;
  let (root_key, chain_key,) = kdf::root_step(&old_state.root_key, &shared_key,);
  let (chain_key, message_key,) = kdf::chain_step(&chain_key,);

  tracing::debug!(target: "double_ratchet_core::ratchet", "performed Diffie-Hellman ratchet step");

  Ok(RatchetState {
    root_key,
    chain_key,
    shared_key,
    message_key,
    local_ephemeral_key_pair,
    remote_ephemeral_public_key,
  })
}

/// Performs a symmetric ratchet step.
///
/// Only the chain key and message key change.
///
/// # Params
///
/// old_state --- The state to advance.  
pub fn ratchet_without_new_key(old_state: &RatchetState,) -> RatchetState {
  let (chain_key, message_key,) = kdf::chain_step(&old_state.chain_key,);

  tracing::trace!(target: "double_ratchet_core::ratchet", "performed symmetric ratchet step");

  RatchetState {
    chain_key,
    message_key,
    ..old_state.clone()
  }
}

#[cfg(test,)]
mod tests {
  use super::*;
  use crate::{aead, message::{PlaintextMessage, PlaintextMessageType,},};

  fn key_pairs() -> (KeyPair, KeyPair,) {
    let mut rand = rand::thread_rng();

    (KeyPair::generate(&mut rand,), KeyPair::generate(&mut rand,),)
  }

  #[test]
  fn test_initialize() {
    let (alice, bob,) = key_pairs();
    let alice_state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing Alice");
    let bob_state = initialize(&bob.private_key, &alice.public_key,)
      .expect("Error initializing Bob");

    assert_eq!(alice_state.root_key, bob_state.root_key, "Root keys differ",);
    assert_eq!(alice_state.chain_key, bob_state.chain_key, "Chain keys differ",);
    assert_eq!(alice_state.message_key, bob_state.message_key, "Message keys differ",);
    assert_eq!(alice_state.shared_key, bob_state.shared_key, "Shared keys differ",);
    assert_ne!(alice_state.local_ephemeral_key_pair, bob_state.local_ephemeral_key_pair, "Ephemeral key pairs match",);
    assert_eq!(alice_state.remote_ephemeral_public_key, bob.public_key, "Remote key is not Bob's long-term key",);
    assert_eq!(bob_state.remote_ephemeral_public_key, alice.public_key, "Remote key is not Alice's long-term key",);
  }
  #[test]
  fn test_initialize_bad_key() {
    let (alice, _,) = key_pairs();

    initialize(&alice.private_key, &PublicKey::from([0; 32],),)
      .expect_err("Initialized with a low order public key");
  }
  #[test]
  fn test_ratchet_with_new_key() {
    let (alice, bob,) = key_pairs();
    let state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing state");
    let (local, remote,) = key_pairs();
    let new_state = ratchet_with_new_key(&state, local.clone(), remote.public_key,)
      .expect("Error ratcheting state");

    assert_ne!(state.root_key, new_state.root_key, "Root key did not change",);
    assert_ne!(state.chain_key, new_state.chain_key, "Chain key did not change",);
    assert_ne!(state.shared_key, new_state.shared_key, "Shared key did not change",);
    assert_ne!(state.message_key, new_state.message_key, "Message key did not change",);
    assert_eq!(new_state.local_ephemeral_key_pair, local, "Local ephemeral key pair was not replaced",);
    assert_eq!(new_state.remote_ephemeral_public_key, remote.public_key, "Remote ephemeral key was not replaced",);

    ratchet_with_new_key(&state, local, PublicKey::from([0; 32],),)
      .expect_err("Ratcheted with a low order public key");
  }
  #[test]
  fn test_ratchet_with_new_key_agreement() {
    let (alice, bob,) = key_pairs();
    let alice_state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing Alice");
    let bob_state = initialize(&bob.private_key, &alice.public_key,)
      .expect("Error initializing Bob");
    let alice_ephemeral = alice_state.local_ephemeral_key_pair.clone();
    let bob_ephemeral = bob_state.local_ephemeral_key_pair.clone();
    let alice_public = alice_ephemeral.public_key;
    let alice_state = ratchet_with_new_key(&alice_state, alice_ephemeral, bob_ephemeral.public_key,)
      .expect("Error ratcheting Alice");
    let bob_state = ratchet_with_new_key(&bob_state, bob_ephemeral, alice_public,)
      .expect("Error ratcheting Bob");

    assert_eq!(alice_state.root_key, bob_state.root_key, "Root keys differ after the step",);
    assert_eq!(alice_state.message_key, bob_state.message_key, "Message keys differ after the step",);
  }
  #[test]
  fn test_ratchet_without_new_key() {
    let (alice, bob,) = key_pairs();
    let state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing state");
    let new_state = ratchet_without_new_key(&state,);

    assert_ne!(state.chain_key, new_state.chain_key, "Chain key did not change",);
    assert_ne!(state.message_key, new_state.message_key, "Message key did not change",);
    assert_eq!(state.root_key, new_state.root_key, "Root key changed",);
    assert_eq!(state.shared_key, new_state.shared_key, "Shared key changed",);
    assert_eq!(state.local_ephemeral_key_pair, new_state.local_ephemeral_key_pair, "Local ephemeral key pair changed",);
    assert_eq!(state.remote_ephemeral_public_key, new_state.remote_ephemeral_public_key, "Remote ephemeral key changed",);
  }
  #[test]
  fn test_ratchet_three_steps() {
    let (alice, bob,) = key_pairs();
    let state0 = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing state");
    let state1 = ratchet_without_new_key(&state0,);
    let state2 = ratchet_without_new_key(&state1,);
    let state3 = ratchet_without_new_key(&state2,);
    let keys = [&state0.message_key, &state1.message_key, &state2.message_key, &state3.message_key,];

    for (index, a,) in keys.iter().enumerate() {
      for b in &keys[index + 1..] {
        assert_ne!(a, b, "Message keys repeated",);
      }
    }
  }
  #[test]
  fn test_alice_and_bob() {
    let (alice, bob,) = key_pairs();
    let alice_state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing Alice");
    let bob_state = initialize(&bob.private_key, &alice.public_key,)
      .expect("Error initializing Bob");

    assert_eq!(alice_state.root_key(), bob_state.root_key(), "Root keys differ",);

    let message = PlaintextMessage::text("Hello Bob",);
    let ciphertext = aead::encrypt(alice_state.message_key(), &message,)
      .expect("Error encrypting Alice's message");
    let received = aead::decrypt(bob_state.message_key(), &ciphertext,)
      .expect("Error decrypting Alice's message");

    assert_eq!(received, message, "Bob received a different message",);

    //Both ends advance and Bob replies.
    let alice_state = ratchet_without_new_key(&alice_state,);
    let bob_state = ratchet_without_new_key(&bob_state,);
    let message = PlaintextMessage::new(PlaintextMessageType::UncompressedText, "Hello Alice".as_bytes(),);
    let ciphertext = aead::encrypt(bob_state.message_key(), &message,)
      .expect("Error encrypting Bob's message");
    let received = aead::decrypt(alice_state.message_key(), &ciphertext,)
      .expect("Error decrypting Bob's message");

    assert_eq!(received, message, "Alice received a different message",);
  }
  #[test]
  fn test_superseded_state_still_decrypts() {
    let (alice, bob,) = key_pairs();
    let state = initialize(&alice.private_key, &bob.public_key,)
      .expect("Error initializing state");
    let message = PlaintextMessage::text("First",);
    let ciphertext = aead::encrypt(state.message_key(), &message,)
      .expect("Error encrypting message");
    let next = ratchet_without_new_key(&state,);

    assert_eq!(aead::decrypt(state.message_key(), &ciphertext,), Ok(message), "Old state failed to decrypt",);
    aead::decrypt(next.message_key(), &ciphertext,)
      .expect_err("New message key decrypted an old message");
  }
}
