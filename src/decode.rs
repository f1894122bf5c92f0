//! Streaming decompression with a decompressed-size cap (component E, §4.3).

use std::io::{Cursor, Read};

use async_compression::tokio::bufread::GzipDecoder;
use bytes::Bytes;
use tokio::io::AsyncReadExt;

use crate::error::GdeltError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveHint {
    Zip,
    Gzip,
    Auto,
}

const ZIP_MAGIC: [u8; 2] = [0x50, 0x4b];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// `decode(bytes, hint) -> byte stream`. Auto-detects by magic prefix; the
/// cumulative decompressed size is checked against `cap_bytes` and the call
/// fails with a security error if exceeded, guarding against decompression
/// bombs.
pub async fn decode(bytes: Bytes, hint: ArchiveHint, cap_bytes: u64) -> Result<Vec<u8>, GdeltError> {
    let kind = match hint {
        ArchiveHint::Zip => ArchiveHint::Zip,
        ArchiveHint::Gzip => ArchiveHint::Gzip,
        ArchiveHint::Auto => detect(&bytes)?,
    };
    match kind {
        ArchiveHint::Zip => decode_zip(bytes, cap_bytes),
        ArchiveHint::Gzip => decode_gzip(bytes, cap_bytes).await,
        ArchiveHint::Auto => unreachable!("resolved above"),
    }
}

fn detect(bytes: &[u8]) -> Result<ArchiveHint, GdeltError> {
    if bytes.len() < 2 {
        return Err(GdeltError::Decode("archive too small to sniff".to_string()));
    }
    if bytes[..2] == ZIP_MAGIC {
        Ok(ArchiveHint::Zip)
    } else if bytes[..2] == GZIP_MAGIC {
        Ok(ArchiveHint::Gzip)
    } else {
        Err(GdeltError::Decode(
            "unrecognized archive magic bytes".to_string(),
        ))
    }
}

/// Extracts the single member of a GDELT archive ZIP (always exactly one
/// TSV file per bucket), enforcing `cap_bytes` as it reads.
fn decode_zip(bytes: Bytes, cap_bytes: u64) -> Result<Vec<u8>, GdeltError> {
    let cursor = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)?;
    if archive.is_empty() {
        return Err(GdeltError::Decode("ZIP archive contains no entries".to_string()));
    }
    let mut file = archive.by_index(0)?;
    read_capped(&mut file, cap_bytes)
}

async fn decode_gzip(bytes: Bytes, cap_bytes: u64) -> Result<Vec<u8>, GdeltError> {
    let reader = tokio::io::BufReader::new(Cursor::new(bytes));
    let mut decoder = GzipDecoder::new(reader);
    let mut buf = vec![0u8; 64 * 1024];
    let mut out = Vec::new();
    loop {
        let n = decoder
            .read(&mut buf)
            .await
            .map_err(|e| GdeltError::Decode(e.to_string()))?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
        if out.len() as u64 > cap_bytes {
            return Err(GdeltError::Security(format!(
                "decompressed size exceeded cap of {cap_bytes} bytes"
            )));
        }
    }
    Ok(out)
}

fn read_capped<R: Read>(reader: &mut R, cap_bytes: u64) -> Result<Vec<u8>, GdeltError> {
    let mut buf = [0u8; 64 * 1024];
    let mut out = Vec::new();
    loop {
        let n = reader.read(&mut buf).map_err(|e| GdeltError::Decode(e.to_string()))?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
        if out.len() as u64 > cap_bytes {
            return Err(GdeltError::Security(format!(
                "decompressed size exceeded cap of {cap_bytes} bytes"
            )));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_zip(content: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut writer = zip::ZipWriter::new(cursor);
            let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
            writer.start_file("data.csv", options).unwrap();
            writer.write_all(content).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn detect_recognizes_zip_magic() {
        let zip_bytes = make_zip(b"hello");
        assert_eq!(detect(&zip_bytes).unwrap(), ArchiveHint::Zip);
    }

    #[test]
    fn detect_rejects_unknown_magic() {
        assert!(detect(&[0x00, 0x01, 0x02]).is_err());
    }

    #[tokio::test]
    async fn decode_zip_round_trips_content() {
        let zip_bytes = make_zip(b"field1\tfield2\n");
        let decoded = decode(Bytes::from(zip_bytes), ArchiveHint::Zip, 1024 * 1024)
            .await
            .unwrap();
        assert_eq!(decoded, b"field1\tfield2\n");
    }

    #[tokio::test]
    async fn decode_zip_over_cap_fails_with_security_error() {
        let zip_bytes = make_zip(&vec![b'a'; 1024]);
        let result = decode(Bytes::from(zip_bytes), ArchiveHint::Zip, 10).await;
        assert!(matches!(result, Err(GdeltError::Security(_))));
    }

    #[tokio::test]
    async fn auto_detect_picks_zip_for_zip_bytes() {
        let zip_bytes = make_zip(b"x");
        let decoded = decode(Bytes::from(zip_bytes), ArchiveHint::Auto, 1024).await;
        assert!(decoded.is_ok());
    }
}
