//! Share codes: a URL rendered as a QR image.

use image::Luma;
use qrcode::QrCode;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ShareError;

const MIN_SIZE: u32 = 256;

/// Encode `url` as a QR code PNG at `out`, overwriting it. Same URL, same image.
pub fn encode_as_scannable_image(url: &str, out: &Path) -> Result<(), ShareError> {
    let code = QrCode::new(url.as_bytes()).map_err(|source| ShareError::Encode {
        url: url.to_string(),
        source,
    })?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_SIZE, MIN_SIZE)
        .build();

    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ShareError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    img.save(out).map_err(|source| ShareError::Image {
        path: out.to_path_buf(),
        source,
    })?;

    debug!(out = %out.display(), "wrote share code");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const URL: &str = "https://raw.githubusercontent.com/someone/reports/main/report.png";

    #[test]
    fn test_writes_square_png() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("qr/share_qr.png");
        encode_as_scannable_image(URL, &out).unwrap();

        let img = image::open(&out).unwrap();
        assert_eq!(img.width(), img.height());
        assert!(img.width() >= MIN_SIZE);
    }

    #[test]
    fn test_deterministic_and_overwrites() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        encode_as_scannable_image(URL, &a).unwrap();
        encode_as_scannable_image(URL, &b).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());

        encode_as_scannable_image("https://example.com/other.png", &a).unwrap();
        assert_ne!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_oversized_payload_is_encode_error() {
        let dir = tempdir().unwrap();
        let huge = "x".repeat(8000);
        let err = encode_as_scannable_image(&huge, &dir.path().join("q.png")).unwrap_err();
        assert!(matches!(err, ShareError::Encode { .. }));
    }
}
