//! Defines the [Error] type returned by ratchet and message operations.
//! 
//! Last Moddified --- 2026-10-19

use thiserror::Error;

/// An error returned from a ratchet step or from locking/opening a message.
/// 
/// None of these errors are recoverable by retrying the same operation with the same key.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug,)]
pub enum Error {
  /// The authentication tag of a ciphertext did not verify.
  /// 
  /// The ciphertext must be discarded.
  #[error("ciphertext failed authentication")]
  AuthenticationFailure,
  /// An authenticated plaintext did not start with a known message type tag.
  #[error("plaintext has an unknown message type")]
  UnknownMessageType,
  /// The remote public key produced a non-contributory shared secret.
  #[error("key agreement with the remote public key failed")]
  KeyAgreementFailure,
  /// The encryption errored.
  #[error("message encryption failed")]
  Encryption,
}

/// The result of fallible ratchet operations.
pub type Result<T,> = std::result::Result<T, Error>;
