//! The seam between extracted text and a narration engine.
//!
//! Engines are external collaborators: a device-local synthesizer that speaks
//! immediately, or a cloud service reached over the network. The core only
//! prepares text and hands over an opaque voice identifier; everything past
//! this trait belongs to the excluded device/network layers.

use crate::error::Result;

/// One narration request: cleaned text plus a voice selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance<'a> {
    /// Narration-ready plain text (see [`crate::clean::clean`]).
    pub text: &'a str,
    /// Opaque engine-specific voice identifier, e.g. "en-US-AvaNeural".
    pub voice: &'a str,
}

/// A text-to-speech collaborator.
pub trait NarrationEngine {
    /// Synthesize one utterance, returning encoded audio. Engines that play
    /// audio directly on the device may return an empty buffer.
    fn synthesize(&mut self, utterance: &Utterance<'_>) -> Result<Vec<u8>>;
}
