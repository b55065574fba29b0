//! Defines the [PlaintextMessage] types.
//! 
//! Last Moddified --- 2026-10-19

#[cfg(feature = "serde",)]
mod serde;

use crate::{Error, Result,};

/*
 * Definition of an encoded `PlaintextMessage`.
 * |-------Size - 1+ bytes-------|
 * |type    - 1 byte             |
 * |payload - 0+ bytes           |
 * |-----------------------------|
 */

/// The type of a [PlaintextMessage] and its one byte wire tag.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug,)]
#[repr(u8)]
pub enum PlaintextMessageType {
  /// Exchange of long-term public keys.
  Handshake = b'H',
  /// New ephemeral key material.
  Ratchet = b'R',
  /// An error report.
  Error = b'E',
  /// Compressed UTF-8 text.
  CompressedText = b'C',
  /// Uncompressed UTF-8 text.
  UncompressedText = b'U',
  /// Binary data.
  Data = b'D',
}

impl PlaintextMessageType {
  /// Every message type.
  pub const ALL: [PlaintextMessageType; 6] = [
    PlaintextMessageType::Handshake,
    PlaintextMessageType::Ratchet,
    PlaintextMessageType::Error,
    PlaintextMessageType::CompressedText,
    PlaintextMessageType::UncompressedText,
    PlaintextMessageType::Data,
  ];

  /// Looks up the message type with the tag `value`.
  ///
  /// Returns `None` for unrecognised tags.
  ///
  /// # Params
  ///
  /// value --- The tag byte.  
  pub fn from_byte(value: u8,) -> Option<Self> {
    Self::ALL.iter().copied().find(|message_type,| message_type.value() == value,)
  }
  /// The wire tag of this message type.
  #[inline]
  pub const fn value(self,) -> u8 { self as u8 }
  /// Whether this type carries protocol metadata rather than content.
  #[inline]
  pub fn is_metadata(self,) -> bool {
    match self {
      PlaintextMessageType::Handshake
      | PlaintextMessageType::Ratchet
      | PlaintextMessageType::Error => true,
      _ => false,
    }
  }
  /// Whether this type carries user content.
  #[inline]
  pub fn is_content(self,) -> bool { !self.is_metadata() }
}

impl From<PlaintextMessageType> for u8 {
  #[inline]
  fn from(from: PlaintextMessageType,) -> Self { from.value() }
}

/// A typed message payload before encryption or after decryption.
#[derive(PartialEq, Eq, Clone, Hash, Debug,)]
pub struct PlaintextMessage {
  /// The type of the message.
  pub message_type: PlaintextMessageType,
  /// The message data.
  pub payload: Box<[u8]>,
}

impl PlaintextMessage {
  /// Creates a new `PlaintextMessage`.
  ///
  /// # Params
  ///
  /// message_type --- The type of the message.  
  /// payload --- The message data.  
  #[inline]
  pub fn new(message_type: PlaintextMessageType, payload: impl Into<Box<[u8]>>,) -> Self {
    Self { message_type, payload: payload.into(), }
  }
  /// Creates an uncompressed text message.
  ///
  /// # Params
  ///
  /// text --- The message text.  
  #[inline]
  pub fn text(text: &str,) -> Self {
    Self::new(PlaintextMessageType::UncompressedText, text.as_bytes(),)
  }
  /// The length of this message once encoded.
  #[inline]
  pub fn encoded_len(&self,) -> usize { 1 + self.payload.len() }
  /// Appends the encoded message to `buffer`.
  ///
  /// # Params
  ///
  /// buffer --- The buffer to encode into.  
  pub fn encode_into(&self, buffer: &mut Vec<u8>,) {
    buffer.reserve(self.encoded_len(),);
    buffer.push(self.message_type.value(),);
    buffer.extend_from_slice(&self.payload,);
  }
  /// Decodes a message from `bytes`.
  ///
  /// Fails with `UnknownMessageType` if `bytes` is empty or its first byte is not a known
  /// tag.
  ///
  /// # Params
  ///
  /// bytes --- The encoded message.  
  pub fn decode(bytes: &[u8],) -> Result<Self> {
    let (&tag, payload,) = bytes.split_first().ok_or(Error::UnknownMessageType,)?;
    let message_type = PlaintextMessageType::from_byte(tag,).ok_or(Error::UnknownMessageType,)?;

    Ok(Self::new(message_type, payload,))
  }
}

#[cfg(test,)]
mod tests {
  use super::*;

  #[test]
  fn test_message_type_tags() {
    const TAGS: [(PlaintextMessageType, u8,); 6] = [
      (PlaintextMessageType::Handshake, 0x48,),
      (PlaintextMessageType::Ratchet, 0x52,),
      (PlaintextMessageType::Error, 0x45,),
      (PlaintextMessageType::CompressedText, 0x43,),
      (PlaintextMessageType::UncompressedText, 0x55,),
      (PlaintextMessageType::Data, 0x44,),
    ];

    for &(message_type, tag,) in TAGS.iter() {
      assert_eq!(message_type.value(), tag, "Wrong tag for {:?}", message_type,);
      assert_eq!(u8::from(message_type,), tag, "Wrong tag for {:?}", message_type,);
      assert_eq!(PlaintextMessageType::from_byte(tag,), Some(message_type), "Wrong type for {:#04x}", tag,);
    }

    assert_eq!(PlaintextMessageType::from_byte(0x00,), None, "Recognised 0x00",);
    assert_eq!(PlaintextMessageType::from_byte(0xFF,), None, "Recognised 0xFF",);
    assert_eq!(PlaintextMessageType::from_byte(b'h',), None, "Tags are case insensitive",);
  }
  #[test]
  fn test_message_type_groups() {
    let metadata = PlaintextMessageType::ALL.iter().filter(|t,| t.is_metadata(),).count();

    assert_eq!(metadata, 3, "Wrong number of metadata types",);
    assert!(PlaintextMessageType::Data.is_content(), "Data is not content",);
    assert!(PlaintextMessageType::Handshake.is_metadata(), "Handshake is not metadata",);
  }
  #[test]
  fn test_message_equality() {
    let message = PlaintextMessage::new(PlaintextMessageType::Handshake, vec![1u8, 2, 3,],);

    assert_eq!(message, PlaintextMessage::new(PlaintextMessageType::Handshake, &[1u8, 2, 3,][..],), "Equal messages differ",);
    assert_ne!(message, PlaintextMessage::new(PlaintextMessageType::Handshake, vec![1u8, 2, 4,],), "Payload was not compared",);
    assert_ne!(message, PlaintextMessage::new(PlaintextMessageType::Ratchet, vec![1u8, 2, 3,],), "Type was not compared",);
  }
  #[test]
  fn test_message_encoding() {
    let message = PlaintextMessage::text("Hello 世界 🌍",);
    let mut buffer = vec![0xAA];

    message.encode_into(&mut buffer,);
    assert_eq!(buffer[0], 0xAA, "Existing buffer data was overwritten",);
    assert_eq!(buffer[1], b'U', "Wrong tag encoded",);
    assert_eq!(buffer.len(), 1 + message.encoded_len(), "Wrong encoded length",);

    let other = PlaintextMessage::decode(&buffer[1..],)
      .expect("Error decoding message");
    assert_eq!(other, message, "Message decoded incorrectly",);
    assert_eq!(std::str::from_utf8(&other.payload,), Ok("Hello 世界 🌍"), "Text was corrupted",);

    let empty = PlaintextMessage::decode(&[b'E'],)
      .expect("Error decoding empty message");
    assert_eq!(empty, PlaintextMessage::new(PlaintextMessageType::Error, Vec::<u8>::new(),), "Empty message decoded incorrectly",);

    assert_eq!(PlaintextMessage::decode(&[],), Err(Error::UnknownMessageType), "Decoded an empty buffer",);
    assert_eq!(PlaintextMessage::decode(&[0, 1, 2,],), Err(Error::UnknownMessageType), "Decoded an unknown tag",);
  }
}
