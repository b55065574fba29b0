//! An implementation of the double ratchet state machine.
//! 
//! Last Moddified --- 2026-10-19
//!
//! The ratchet state is an immutable snapshot; each step returns a new [RatchetState].
//! Messages are sealed under the current [MessageKey] with an AEAD algorithm.
//!
//! use `--features serde` to provide serde implementations of the message types.
//!
//! # Example
//!
//! ```rust
//! use double_ratchet_core::{
//!   KeyPair, PlaintextMessage, StaticSecret,
//!   aead, ratchet,
//! };
//!
//! let alice: KeyPair = StaticSecret::from([1; 32]).into();
//! let bob: KeyPair = StaticSecret::from([2; 32]).into();
//! let alice_state = ratchet::initialize(&alice.private_key, &bob.public_key,)
//!   .expect("Initialized Alice");
//! let bob_state = ratchet::initialize(&bob.private_key, &alice.public_key,)
//!   .expect("Initialized Bob");
//!
//! let message = PlaintextMessage::text("Hello Bob",);
//! let ciphertext = aead::encrypt(alice_state.message_key(), &message,)
//!   .expect("Locked the message");
//!
//! assert_eq!(aead::decrypt(bob_state.message_key(), &ciphertext,), Ok(message),);
//!
//! let alice_state = ratchet::ratchet_without_new_key(&alice_state,);
//! let bob_state = ratchet::ratchet_without_new_key(&bob_state,);
//!
//! assert_eq!(alice_state.message_key(), bob_state.message_key(),);
//! ```

#![deny(missing_docs,)]

pub use generic_array;
pub use generic_array::typenum;
pub use x25519_dalek::{PublicKey, StaticSecret,};

pub mod key;
pub mod kdf;
pub mod agreement;
pub mod ratchet;
pub mod message;
pub mod aead;
mod session;
mod error;

pub use self::{
  key::{KEY_LENGTH, RootKey, ChainKey, SharedKey, MessageKey,},
  agreement::KeyPair,
  ratchet::RatchetState,
  message::{PlaintextMessage, PlaintextMessageType,},
  aead::Ciphertext,
  session::*,
  error::*,
};
