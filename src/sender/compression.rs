use crate::buffer::Batch;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Gzip a batch's report body without building the joined string first.
pub fn compress_batch(batch: &Batch) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for entry in batch.entries() {
        encoder.write_all(entry.as_bytes())?;
        encoder.write_all(b"\n")?;
    }
    encoder.finish()
}

pub fn compress_payload(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()
}

pub fn decompress_payload(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(compressed);
    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload)?;
    Ok(payload)
}
