//! Defines serde for the [Ciphertext] type.
//! 
//! Last Moddified --- 2026-10-19

use super::{Ciphertext, NONCE_LEN,};
use ::serde::{
  ser::{Serialize, Serializer, SerializeTupleStruct,},
  de::{Deserialize, Deserializer, SeqAccess, Visitor, Error as _,},
};
use std::fmt;

static FIELDS: &[&str] = &[
  "nonce",
  "data",
];

impl Serialize for Ciphertext {
  fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error>
    where S: Serializer, {
    let mut serializer = serializer.serialize_tuple_struct(stringify!(Ciphertext,), FIELDS.len(),)?;

    serializer.serialize_field(&self.nonce,)?;
    serializer.serialize_field(&self.data,)?;
    serializer.end()
  }
}

impl<'de,> Deserialize<'de> for Ciphertext {
  fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error>
    where D: Deserializer<'de>, {
    struct CiphertextVisitor;

    impl<'de,> Visitor<'de> for CiphertextVisitor {
      type Value = Ciphertext;

      #[inline]
      fn expecting(&self, fmt: &mut fmt::Formatter,) -> fmt::Result {
        write!(fmt, "a tuple of {} elements", FIELDS.len(),)
      }
      fn visit_seq<A,>(self, mut seq: A,) -> Result<Self::Value, A::Error>
        where A: SeqAccess<'de>, {
        let nonce = seq.next_element::<[u8; NONCE_LEN]>()?
          .ok_or_else(|| A::Error::invalid_length(0, &self,),)?;
        let data = seq.next_element::<Box<[u8]>>()?
          .ok_or_else(|| A::Error::invalid_length(1, &self,),)?;

        Ok(Ciphertext { nonce, data, })
      }
    }

    deserializer.deserialize_tuple_struct(stringify!(Ciphertext,), FIELDS.len(), CiphertextVisitor,)
  }
}

#[cfg(test,)]
mod tests {
  use super::*;
  use crate::{aead, key::{MessageKey, KEY_LENGTH,}, message::PlaintextMessage,};

  #[test]
  fn test_ciphertext_serde() {
    let key = MessageKey::from([5; KEY_LENGTH],);
    let message = PlaintextMessage::text("serialised",);
    let ciphertext = aead::encrypt(&key, &message,)
      .expect("Error encrypting the message");
    let serialised = serde_cbor::to_vec(&ciphertext,)
      .expect("Error serialising the Ciphertext");
    let other: Ciphertext = serde_cbor::from_slice(&serialised,)
      .expect("Error deserialising the Ciphertext");

    assert_eq!(ciphertext, other, "Ciphertext deserialised incorrectly",);
    assert_eq!(aead::decrypt(&key, &other,), Ok(message), "Deserialised Ciphertext failed to open",);
  }
}
