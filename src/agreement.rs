//! Defines the [KeyPair] type and X25519 key agreement.
//! 
//! Last Moddified --- 2026-10-19

use crate::{key::SharedKey, Error, Result,};
use rand::{RngCore, CryptoRng,};
use x25519_dalek::{PublicKey, StaticSecret,};
use std::fmt;

/// An X25519 key pair.
///
/// Used both for the long-term identity of a party and for the ephemeral keys of each
/// Diffie-Hellman ratchet step.
#[derive(Clone,)]
pub struct KeyPair {
  /// The private half of the pair.
  pub private_key: StaticSecret,
  /// The public half of the pair.
  pub public_key: PublicKey,
}

impl KeyPair {
  /// Generates a new `KeyPair` from random state.
  ///
  /// # Params
  ///
  /// rand --- The source of randomness.  
  #[inline]
  pub fn generate<Rand,>(rand: &mut Rand,) -> Self
    where Rand: RngCore + CryptoRng, {
    StaticSecret::random_from_rng(rand,).into()
  }
  /// Computes the shared key between this pair's private key and `remote`.
  ///
  /// # Params
  ///
  /// remote --- The public key of the other party.  
  #[inline]
  pub fn shared_secret(&self, remote: &PublicKey,) -> Result<SharedKey> {
    shared_secret(&self.private_key, remote,)
  }
}

impl From<StaticSecret> for KeyPair {
  #[inline]
  fn from(private_key: StaticSecret,) -> Self {
    let public_key = PublicKey::from(&private_key,);

    Self { private_key, public_key, }
  }
}

impl PartialEq for KeyPair {
  fn eq(&self, rhs: &Self,) -> bool {
    //The public key is derived from the private key.
    self.public_key == rhs.public_key
  }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
  fn fmt(&self, fmt: &mut fmt::Formatter,) -> fmt::Result {
    fmt.debug_struct(stringify!(KeyPair),)
      .field("public_key", &self.public_key,)
      .finish_non_exhaustive()
  }
}

/// Computes `ECDH(private_key, public_key)`.
///
/// Fails with `KeyAgreementFailure` if `public_key` is a low order point, which would make
/// the shared key independent of `private_key`.
///
/// # Params
///
/// private_key --- The local private key.  
/// public_key --- The remote public key.  
pub fn shared_secret(private_key: &StaticSecret, public_key: &PublicKey,) -> Result<SharedKey> {
  let shared = private_key.diffie_hellman(public_key,);

  if !shared.was_contributory() {
    tracing::debug!(target: "double_ratchet_core::agreement", "rejected a non-contributory public key");

    return Err(Error::KeyAgreementFailure)
  }

  Ok(SharedKey::from(*shared.as_bytes(),))
}

#[cfg(test,)]
mod tests {
  use super::*;

  #[test]
  fn test_shared_secret_commutes() {
    let alice = KeyPair::generate(&mut rand::thread_rng(),);
    let bob = KeyPair::generate(&mut rand::thread_rng(),);
    let alice_shared = alice.shared_secret(&bob.public_key,)
      .expect("Error computing Alice's shared key");
    let bob_shared = shared_secret(&bob.private_key, &alice.public_key,)
      .expect("Error computing Bob's shared key");

    assert_eq!(alice_shared, bob_shared, "Shared keys differ",);
  }
  #[test]
  fn test_shared_secret_low_order() {
    let alice = KeyPair::generate(&mut rand::thread_rng(),);

    assert_eq!(
      alice.shared_secret(&PublicKey::from([0; 32],),),
      Err(Error::KeyAgreementFailure),
      "Accepted the identity point",
    );
  }
  #[test]
  fn test_key_pair_equality() {
    let pair = KeyPair::from(StaticSecret::from([3; 32],),);

    assert_eq!(pair, pair.clone(), "Cloned pair differs",);
    assert_eq!(pair, StaticSecret::from([3; 32],).into(), "Pairs from the same secret differ",);
    assert_ne!(pair, KeyPair::generate(&mut rand::thread_rng(),), "Random pair equals a fixed pair",);
    assert!(!format!("{:?}", pair,).contains("private_key"), "Debug output leaked the private key",);
  }
  #[test]
  fn test_key_pair_equality_by_public_key() {
    let pair = KeyPair::from(StaticSecret::from([3; 32],),);
    let other = KeyPair::from(StaticSecret::from([4; 32],),);
    let mismatched = KeyPair { private_key: other.private_key.clone(), public_key: pair.public_key, };

    assert_eq!(pair, mismatched, "Pairs with the same public key differ",);
    assert_ne!(pair, other, "Pairs with different public keys are equal",);
  }
}
