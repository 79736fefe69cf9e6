//! Manifest codec for messages that cross a process boundary.
//!
//! Each boundary message type carries a static manifest tag. The decoder
//! table below is assembled at compile time; a tag missing from it is
//! rejected with [`KeelError::UnknownManifest`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{KeelError, Result};
use crate::model::{PersistenceReply, PersistenceRequest};

/// A message type with a stable wire tag.
pub trait Manifest: Serialize + DeserializeOwned {
    const MANIFEST: &'static str;
}

impl Manifest for PersistenceRequest {
    const MANIFEST: &'static str = "keel.persistence.request";
}

impl Manifest for PersistenceReply {
    const MANIFEST: &'static str = "keel.persistence.reply";
}

/// Encoded message plus the tag that selects its decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEnvelope {
    pub manifest: String,
    pub payload: Vec<u8>,
}

impl WireEnvelope {
    /// Encode a message as JSON under its manifest tag.
    pub fn encode<T: Manifest>(message: &T) -> Result<Self> {
        Ok(Self {
            manifest: T::MANIFEST.to_string(),
            payload: serde_json::to_vec(message)?,
        })
    }

    /// Decode the payload as `T`, failing if the tag names another type.
    pub fn open<T: Manifest>(&self) -> Result<T> {
        if self.manifest != T::MANIFEST {
            return Err(KeelError::Codec(format!(
                "expected manifest {}, got {}",
                T::MANIFEST,
                self.manifest
            )));
        }
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Every message the codec can decode without knowing the type up front.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    PersistenceRequest(PersistenceRequest),
    PersistenceReply(PersistenceReply),
}

type Decoder = fn(&[u8]) -> Result<WireMessage>;

fn decode_request(payload: &[u8]) -> Result<WireMessage> {
    Ok(WireMessage::PersistenceRequest(serde_json::from_slice(payload)?))
}

fn decode_reply(payload: &[u8]) -> Result<WireMessage> {
    Ok(WireMessage::PersistenceReply(serde_json::from_slice(payload)?))
}

static DECODERS: &[(&str, Decoder)] = &[
    (PersistenceRequest::MANIFEST, decode_request),
    (PersistenceReply::MANIFEST, decode_reply),
];

/// Decode an envelope by looking its tag up in the decoder table.
pub fn decode(envelope: &WireEnvelope) -> Result<WireMessage> {
    let decoder = DECODERS
        .iter()
        .find(|(tag, _)| *tag == envelope.manifest)
        .map(|(_, decoder)| *decoder)
        .ok_or_else(|| KeelError::UnknownManifest(envelope.manifest.clone()))?;
    decoder(&envelope.payload)
}

/// Tags known to the decoder table.
pub fn known_manifests() -> impl Iterator<Item = &'static str> {
    DECODERS.iter().map(|(tag, _)| *tag)
}
