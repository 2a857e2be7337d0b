// Stream and file helpers around the codec.
//
// The token format carries no length header, so both directions read the
// whole input into memory, run the codec, and write the result through a
// buffered writer. With the `file-io` feature a SHA-256 of the
// uncompressed side is recorded, so a compress/decompress pair can be
// checked against each other.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::decoder::{self, DecodeError};
use crate::codec::encoder::Encoder;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_stream()` / `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed input size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes, terminator included.
    pub output_size: u64,
    /// Literal-run tokens written.
    pub literal_runs: u64,
    /// Back-reference tokens written.
    pub backrefs: u64,
    /// SHA-256 of the uncompressed input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

impl CompressStats {
    /// Compressed size as a fraction of the input size.
    pub fn ratio(&self) -> f64 {
        ratio(self.output_size, self.input_size)
    }
}

/// Statistics returned by `decompress_stream()` / `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

impl DecompressStats {
    /// Compressed size as a fraction of the reconstructed size.
    pub fn ratio(&self) -> f64 {
        ratio(self.input_size, self.output_size)
    }
}

fn ratio(compressed: u64, uncompressed: u64) -> f64 {
    if uncompressed == 0 {
        return 0.0;
    }
    compressed as f64 / uncompressed as f64
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for stream and file operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Malformed compressed input.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Compress everything `reader` yields and write the stream to `writer`.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
) -> Result<CompressStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut encoder = Encoder::new(&input);
    while encoder.step() {}
    encoder.flush_literals();
    let literal_runs = encoder.literal_runs() as u64;
    let backrefs = encoder.backrefs() as u64;
    let compressed = encoder.finish();

    writer.write_all(&compressed)?;
    writer.flush()?;

    log::debug!(
        "compressed {} bytes to {} ({literal_runs} literal runs, {backrefs} back-references)",
        input.len(),
        compressed.len()
    );

    Ok(CompressStats {
        input_size: input.len() as u64,
        output_size: compressed.len() as u64,
        literal_runs,
        backrefs,
        input_sha256: sha256(&input),
    })
}

/// Decompress the stream `reader` yields and write the result to `writer`.
///
/// `limit` caps the decompressed size; pass `None` for no cap.
pub fn decompress_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    limit: Option<usize>,
) -> Result<DecompressStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let output = decoder::decode_with_limit(&input, limit.unwrap_or(usize::MAX))?;

    writer.write_all(&output)?;
    writer.flush()?;

    log::debug!("decompressed {} bytes to {}", input.len(), output.len());

    Ok(DecompressStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path`, replacing any existing file.
pub fn compress_file(input_path: &Path, output_path: &Path) -> Result<CompressStats, IoError> {
    log::trace!(
        "compress {} -> {}",
        input_path.display(),
        output_path.display()
    );
    let reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    compress_stream(reader, writer)
}

/// Decompress `input_path` into `output_path`, replacing any existing file.
///
/// The output file is only created once the input has decoded cleanly.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    limit: Option<usize>,
) -> Result<DecompressStats, IoError> {
    log::trace!(
        "decompress {} -> {}",
        input_path.display(),
        output_path.display()
    );
    let input = std::fs::read(input_path)?;
    let output = decoder::decode_with_limit(&input, limit.unwrap_or(usize::MAX))?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&output)?;
    writer.flush()?;

    Ok(DecompressStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
