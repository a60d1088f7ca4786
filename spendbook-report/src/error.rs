use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font {}: {reason}", .path.display())]
    Font { path: PathBuf, reason: String },
    #[error("nothing to chart")]
    NoData,
    #[error("create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{what} {value} cannot be charted")]
    OutOfRange { what: String, value: f64 },
    #[error("drawing failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("cannot encode '{url}' as a QR code: {source}")]
    Encode {
        url: String,
        #[source]
        source: qrcode::types::QrError,
    },
    #[error("write {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
