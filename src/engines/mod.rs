//! Engines that drive synthesis requests.
//!
//! Real engines live outside this crate and implement
//! [`SynthesisEngine`](crate::SynthesisEngine) directly. This module holds:
//! - [`Streamed`] - adapts any [`BatchEngine`](crate::BatchEngine) to the callback protocol
//! - [`SilenceEngine`] - renders silence sized to the text, for demos and tests

mod silence;
mod streamed;

pub use silence::SilenceEngine;
pub use streamed::Streamed;
