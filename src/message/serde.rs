//! Defines serde for the [PlaintextMessage] types.
//! 
//! Last Moddified --- 2026-10-19

use super::{PlaintextMessage, PlaintextMessageType,};
use ::serde::{
  ser::{Serialize, Serializer, SerializeTupleStruct,},
  de::{Deserialize, Deserializer, SeqAccess, Visitor, Unexpected, Error as _,},
};
use std::fmt;

static FIELDS: &[&str] = &[
  "message_type",
  "payload",
];

impl Serialize for PlaintextMessageType {
  #[inline]
  fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error>
    where S: Serializer, {
    serializer.serialize_u8(self.value(),)
  }
}

impl<'de,> Deserialize<'de> for PlaintextMessageType {
  fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error>
    where D: Deserializer<'de>, {
    let value = u8::deserialize(deserializer,)?;

    PlaintextMessageType::from_byte(value,).ok_or_else(|| D::Error::invalid_value(
      Unexpected::Unsigned(value.into(),),
      &"a plaintext message type tag",
    ),)
  }
}

impl Serialize for PlaintextMessage {
  fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error>
    where S: Serializer, {
    let mut serializer = serializer.serialize_tuple_struct(stringify!(PlaintextMessage,), FIELDS.len(),)?;

    serializer.serialize_field(&self.message_type,)?;
    serializer.serialize_field(&self.payload,)?;
    serializer.end()
  }
}

impl<'de,> Deserialize<'de> for PlaintextMessage {
  fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error>
    where D: Deserializer<'de>, {
    struct MessageVisitor;

    impl<'de,> Visitor<'de> for MessageVisitor {
      type Value = PlaintextMessage;

      #[inline]
      fn expecting(&self, fmt: &mut fmt::Formatter,) -> fmt::Result {
        write!(fmt, "a tuple of {} elements", FIELDS.len(),)
      }
      fn visit_seq<A,>(self, mut seq: A,) -> Result<Self::Value, A::Error>
        where A: SeqAccess<'de>, {
        let message_type = seq.next_element::<PlaintextMessageType>()?
          .ok_or_else(|| A::Error::invalid_length(0, &self,),)?;
        let payload = seq.next_element::<Box<[u8]>>()?
          .ok_or_else(|| A::Error::invalid_length(1, &self,),)?;

        Ok(PlaintextMessage { message_type, payload, })
      }
    }

    deserializer.deserialize_tuple_struct(stringify!(PlaintextMessage,), FIELDS.len(), MessageVisitor,)
  }
}

#[cfg(test,)]
mod tests {
  use super::*;

  #[test]
  fn test_message_serde() {
    let message = PlaintextMessage::new(PlaintextMessageType::Data, vec![1u8, 2, 3, 4,],);
    let serialised = serde_cbor::to_vec(&message,)
      .expect("Error serialising the PlaintextMessage");
    let other: PlaintextMessage = serde_cbor::from_slice(&serialised,)
      .expect("Error deserialising the PlaintextMessage");

    assert_eq!(message, other, "PlaintextMessage deserialised incorrectly",);
  }
  #[test]
  fn test_message_type_serde() {
    let serialised = serde_cbor::to_vec(&0u8,)
      .expect("Error serialising the tag");

    serde_cbor::from_slice::<PlaintextMessageType>(&serialised,)
      .expect_err("Deserialised an unknown tag");
  }
}
