//! Byte source collection
//!
//! Documents arrive either from a streaming transport or a local file
//! selection. Either way the decoder wants one contiguous buffer, so the
//! reader is drained chunk by chunk until exhaustion and the chunks are
//! concatenated.

use std::io::Read;

use crate::decoder::LoadError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Read `reader` to completion into a single buffer
pub fn collect_bytes<R: Read>(mut reader: R) -> Result<Vec<u8>, LoadError> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn collects_whole_stream() {
        let data: Vec<u8> = (0..=255u8).cycle().take(3 * CHUNK_SIZE + 17).collect();
        let collected = collect_bytes(Cursor::new(data.clone())).expect("read ok");
        assert_eq!(collected, data);
    }

    #[test]
    fn empty_stream_yields_empty_buffer() {
        let collected = collect_bytes(Cursor::new(Vec::new())).expect("read ok");
        assert!(collected.is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("transport dropped"))
        }
    }

    #[test]
    fn read_failure_surfaces_as_load_error() {
        let error = collect_bytes(FailingReader).expect_err("must fail");
        assert!(matches!(error, LoadError::Source(_)));
    }
}
