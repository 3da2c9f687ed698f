use crate::domain::ports::Compressor;
use crate::utils::error::{Result, ShareError};
use std::panic::{catch_unwind, AssertUnwindSafe};

const URI_SAFE_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-$";

/// lz-string `compressToEncodedURIComponent` / `decompressFromEncodedURIComponent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzStringCompressor;

impl Compressor for LzStringCompressor {
    fn compress(&self, input: &str) -> Result<String> {
        Ok(lz_str::compress_to_encoded_uri_component(input))
    }

    fn decompress(&self, input: &str) -> Result<String> {
        // query 解析會把 '+' 變成空白，這裡還原回來
        let payload: String = input
            .chars()
            .map(|c| if c == ' ' { '+' } else { c })
            .collect();

        if payload.is_empty() {
            return Err(ShareError::CompressionError {
                message: "empty payload".to_string(),
            });
        }
        if let Some(bad) = payload.chars().find(|c| !URI_SAFE_ALPHABET.contains(*c)) {
            return Err(ShareError::CompressionError {
                message: format!("unexpected character '{}' in payload", bad),
            });
        }

        // 預設 panic hook 仍會把訊息印到 stderr；這裡只保證不會往上拋
        let decompressed = catch_unwind(AssertUnwindSafe(|| {
            lz_str::decompress_from_encoded_uri_component(payload.as_str())
        }))
        .map_err(|_| ShareError::CompressionError {
            message: "decompressor panicked on corrupt input".to_string(),
        })?
        .ok_or_else(|| ShareError::CompressionError {
            message: "payload is not valid lz-string data".to_string(),
        })?;

        String::from_utf16(&decompressed).map_err(|e| ShareError::CompressionError {
            message: format!("decompressed text is not valid UTF-16: {}", e),
        })
    }
}
