//! Defines the [Key] type and the roles a key can play in the ratchet.
//!
//! Every key is a fixed length byte buffer which is cleared when it is dropped. The
//! role of a key is part of its type so a [ChainKey] can never be passed where a
//! [RootKey] is expected, even if the bytes are identical.
//! 
//! Last Moddified --- 2026-10-19

use crate::{generic_array::GenericArray, typenum::consts::U32,};
use clear_on_drop::ClearOnDrop;
use std::{fmt, hash::{Hash, Hasher,}, marker::PhantomData,};

/// The length of every ratchet key in bytes.
pub const KEY_LENGTH: usize = 32;

/// A marker for the role a [Key] plays.
pub trait Role {
  /// The name used when formatting a key of this role.
  const NAME: &'static str;
}

/// The top level secret advanced by each Diffie-Hellman step.
pub enum Root {}

impl Role for Root { const NAME: &'static str = "RootKey"; }

/// The secret advanced once per message within one Diffie-Hellman epoch.
pub enum Chain {}

impl Role for Chain { const NAME: &'static str = "ChainKey"; }

/// The output of a Diffie-Hellman key agreement.
pub enum Shared {}

impl Role for Shared { const NAME: &'static str = "SharedKey"; }

/// The single use key for one message.
pub enum Message {}

impl Role for Message { const NAME: &'static str = "MessageKey"; }

/// A root key.
pub type RootKey = Key<Root,>;
/// A chain key.
pub type ChainKey = Key<Chain,>;
/// A shared key.
pub type SharedKey = Key<Shared,>;
/// A message key.
pub type MessageKey = Key<Message,>;

/// A `KEY_LENGTH` byte secret tagged with its role.
///
/// Two keys are equal if their bytes are equal.
pub struct Key<Role,> {
  /// The key bytes.
  bytes: ClearOnDrop<GenericArray<u8, U32>>,
  _role: PhantomData<Role>,
}

impl<R,> Key<R,> {
  /// Creates an all zero key to be filled by key derivation.
  #[inline]
  pub(crate) fn zeroed() -> Self {
    Self { bytes: ClearOnDrop::new(GenericArray::default(),), _role: PhantomData, }
  }
  /// Copies a key out of `bytes`.
  ///
  /// Returns `None` if `bytes` is not `KEY_LENGTH` bytes long.
  ///
  /// # Params
  ///
  /// bytes --- The key bytes.  
  pub fn from_slice(bytes: &[u8],) -> Option<Self> {
    if bytes.len() != KEY_LENGTH { return None }

    let mut key = Self::zeroed();

    key.bytes.copy_from_slice(bytes,);

    Some(key)
  }
  /// The key bytes.
  #[inline]
  pub fn as_bytes(&self,) -> &[u8] { &self.bytes[..] }
  /// The key bytes for key derivation to write into.
  #[inline]
  pub(crate) fn as_mut_bytes(&mut self,) -> &mut [u8] { &mut self.bytes[..] }
}

impl<R,> From<[u8; KEY_LENGTH]> for Key<R,> {
  /// Creates a key from bytes.
  ///
  /// The local copy of `bytes` is cleared.
  fn from(mut bytes: [u8; KEY_LENGTH],) -> Self {
    let mut key = Self::zeroed();

    key.bytes.copy_from_slice(&ClearOnDrop::new(&mut bytes[..],),);

    key
  }
}

impl<R,> AsRef<[u8]> for Key<R,> {
  #[inline]
  fn as_ref(&self,) -> &[u8] { self.as_bytes() }
}

impl<R,> Clone for Key<R,> {
  #[inline]
  fn clone(&self,) -> Self {
    let mut key = Self::zeroed();

    key.bytes.copy_from_slice(self.as_bytes(),);

    key
  }
}

impl<R,> PartialEq for Key<R,> {
  #[inline]
  fn eq(&self, rhs: &Self,) -> bool { self.as_bytes() == rhs.as_bytes() }
}

impl<R,> Eq for Key<R,> {}

impl<R,> Hash for Key<R,> {
  #[inline]
  fn hash<H,>(&self, state: &mut H,)
    where H: Hasher, {
    self.as_bytes().hash(state,)
  }
}

impl<R,> fmt::Debug for Key<R,>
  where R: Role, {
  //Never format the key material.
  fn fmt(&self, fmt: &mut fmt::Formatter,) -> fmt::Result {
    write!(fmt, "{}(..)", R::NAME,)
  }
}

#[cfg(test,)]
mod tests {
  use super::*;
  use std::{any::TypeId, collections::HashMap,};

  #[test]
  fn test_key_equality() {
    let key1 = RootKey::from([1; KEY_LENGTH],);
    let key2 = RootKey::from_slice(&[1; KEY_LENGTH],).expect("Error creating key from slice");
    let key3 = RootKey::from([2; KEY_LENGTH],);

    assert_eq!(key1, key2, "Keys with the same bytes are not equal",);
    assert_ne!(key1, key3, "Keys with different bytes are equal",);
    assert_eq!(key1, key1.clone(), "Cloned key is not equal",);
    assert_ne!(TypeId::of::<RootKey>(), TypeId::of::<ChainKey>(), "Root and chain keys share a type",);
    assert_ne!(TypeId::of::<SharedKey>(), TypeId::of::<MessageKey>(), "Shared and message keys share a type",);
  }
  #[test]
  fn test_key_hash() {
    let mut map = HashMap::new();

    map.insert(ChainKey::from([7; KEY_LENGTH],), "value",);

    assert_eq!(map.get(&ChainKey::from([7; KEY_LENGTH],),), Some(&"value"), "Key lookup by content failed",);
    assert_eq!(map.get(&ChainKey::from([8; KEY_LENGTH],),), None, "Found a key with different content",);
  }
  #[test]
  fn test_key_from_slice() {
    assert!(MessageKey::from_slice(&[1; 31],).is_none(), "Accepted a short key",);
    assert!(MessageKey::from_slice(&[1; 33],).is_none(), "Accepted a long key",);
    assert!(MessageKey::from_slice(&[],).is_none(), "Accepted an empty key",);
  }
  #[test]
  fn test_key_debug() {
    let key = SharedKey::from([0xAB; KEY_LENGTH],);
    let debug = format!("{:?}", key,);

    assert_eq!(debug, "SharedKey(..)", "Debug output is wrong",);
    assert!(!debug.to_lowercase().contains("ab, "), "Debug output leaked key bytes",);
  }
}
