//! Retrolz: a byte-oriented LZ codec for shrinking binary assets that an
//! 8-bit machine decompresses in place.
//!
//! The crate provides:
//! - The codec itself (`codec`): `encode`, `decode`, and a token reader
//! - Stream and file helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use retrolz::codec;
//!
//! let text = b"this is some text this is some text this is some text this is some text";
//! let packed = codec::encode(text);
//! assert_eq!(packed.len(), 24);
//! assert_eq!(codec::decode(&packed).unwrap(), text);
//! ```

pub mod codec;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{DecodeError, decode, encode};
