//! Defines the key derivation functions of the ratchet.
//!
//! All derivations use HKDF-SHA256. Each derived key is expanded under its own info label
//! so that two keys derived from the same input are never identical.
//! 
//! Last Moddified --- 2026-10-19

use crate::key::{Key, KEY_LENGTH, RootKey, ChainKey, SharedKey, MessageKey,};
use clear_on_drop::ClearOnDrop;
use hkdf::Hkdf;
use sha2::Sha256;

/// The info label used to derive the first root key of a session.
pub const INITIAL_ROOT_INFO: &[u8] = b"double-ratchet/initial-root";
/// The info label used to derive root keys.
pub const ROOT_INFO: &[u8] = b"double-ratchet/root";
/// The info label used to derive chain keys.
pub const CHAIN_INFO: &[u8] = b"double-ratchet/chain";
/// The info label used to derive message keys.
pub const MESSAGE_INFO: &[u8] = b"double-ratchet/message";

/// Expands a single key from `hkdf` under `info`.
fn expand<Role,>(hkdf: &Hkdf<Sha256>, info: &[u8],) -> Key<Role,> {
  let mut key = Key::zeroed();

  hkdf.expand(info, key.as_mut_bytes(),)
    .expect("Failed to expand a key; KEY_LENGTH is always a valid HKDF-SHA256 output length");

  key
}

/// Derives the chain key and message key which follow `ikm`.
fn split_chain(ikm: &[u8],) -> (ChainKey, MessageKey,) {
  let hkdf = Hkdf::<Sha256>::new(None, ikm,);

  (expand(&hkdf, CHAIN_INFO,), expand(&hkdf, MESSAGE_INFO,),)
}

/// Derives the first root key of a session from the long-term shared key.
///
/// # Params
///
/// shared_key --- The shared key of both parties' long-term keys.  
pub fn initial_root(shared_key: &SharedKey,) -> RootKey {
  expand(&Hkdf::<Sha256>::new(None, shared_key.as_bytes(),), INITIAL_ROOT_INFO,)
}

/// Derives the first chain key and message key of a session from its root key.
///
/// # Params
///
/// root_key --- The initial root key.  
#[inline]
pub fn initial_chain(root_key: &RootKey,) -> (ChainKey, MessageKey,) {
  split_chain(root_key.as_bytes(),)
}

/// Derives a new root key and chain key from the current root key and the shared key of
/// a new Diffie-Hellman step.
///
/// # Params
///
/// root_key --- The current root key.  
/// shared_key --- The shared key of the new ephemeral keys.  
pub fn root_step(root_key: &RootKey, shared_key: &SharedKey,) -> (RootKey, ChainKey,) {
  //The concatenated input key material.
  let mut ikm = [0; 2 * KEY_LENGTH];
  let mut ikm = ClearOnDrop::new(&mut ikm[..],);
  let (root, shared,) = ikm.split_at_mut(KEY_LENGTH,);

  root.copy_from_slice(root_key.as_bytes(),);
  shared.copy_from_slice(shared_key.as_bytes(),);

  let hkdf = Hkdf::<Sha256>::new(None, &ikm,);

  (expand(&hkdf, ROOT_INFO,), expand(&hkdf, CHAIN_INFO,),)
}

/// Derives the next chain key and the message key for the current chain position.
///
/// Only the chain key is consumed; root and shared keys are untouched by this step.
///
/// # Params
///
/// chain_key --- The current chain key.  
#[inline]
pub fn chain_step(chain_key: &ChainKey,) -> (ChainKey, MessageKey,) {
  split_chain(chain_key.as_bytes(),)
}

#[cfg(test,)]
mod tests {
  use super::*;

  #[test]
  fn test_chain_step() {
    let chain_key = ChainKey::from([1; KEY_LENGTH],);
    let (next_chain, message_key,) = chain_step(&chain_key,);
    let (other_chain, other_message,) = chain_step(&chain_key,);

    assert_eq!(next_chain, other_chain, "Chain step is not deterministic",);
    assert_eq!(message_key, other_message, "Chain step is not deterministic",);
    assert_ne!(next_chain, chain_key, "Chain key did not advance",);
    assert_ne!(next_chain.as_bytes(), message_key.as_bytes(), "Chain and message keys are not separated",);
  }
  #[test]
  fn test_root_step() {
    let root_key = RootKey::from([1; KEY_LENGTH],);
    let shared_key = SharedKey::from([2; KEY_LENGTH],);
    let (next_root, chain_key,) = root_step(&root_key, &shared_key,);
    let (other_root, _,) = root_step(&root_key, &SharedKey::from([3; KEY_LENGTH],),);

    assert_ne!(next_root, root_key, "Root key did not advance",);
    assert_ne!(next_root.as_bytes(), chain_key.as_bytes(), "Root and chain keys are not separated",);
    assert_ne!(next_root, other_root, "Shared key was not mixed into the root key",);
    assert_eq!(root_step(&root_key, &shared_key,).0, next_root, "Root step is not deterministic",);
  }
  #[test]
  fn test_initial_keys() {
    let shared_key = SharedKey::from([4; KEY_LENGTH],);
    let root_key = initial_root(&shared_key,);
    let (chain_key, message_key,) = initial_chain(&root_key,);

    assert_ne!(root_key.as_bytes(), shared_key.as_bytes(), "Root key is the shared key",);
    assert_ne!(chain_key.as_bytes(), root_key.as_bytes(), "Chain key is the root key",);
    assert_ne!(chain_key.as_bytes(), message_key.as_bytes(), "Chain and message keys are not separated",);
    assert_ne!(root_step(&root_key, &shared_key,).0, root_key, "Root key did not advance",);
  }
  #[test]
  fn test_chain_sequence() {
    use std::collections::HashSet;

    #[cfg(feature = "test-large-data",)]
    const ROUNDS: usize = 10000;
    #[cfg(not(feature = "test-large-data",),)]
    const ROUNDS: usize = 100;

    let mut chain_key = ChainKey::from([0; KEY_LENGTH],);
    let mut message_keys = HashSet::new();

    for _ in 0..ROUNDS {
      let (next, message_key,) = chain_step(&chain_key,);

      assert!(message_keys.insert(message_key,), "Message key has been produced before",);
      chain_key = next;
    }
  }
}
