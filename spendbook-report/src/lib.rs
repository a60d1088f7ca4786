//! spendbook-report: report images and share codes

pub mod error;
pub mod renderer;
pub mod share;

pub use error::{RenderError, ShareError};
pub use renderer::ReportRenderer;
pub use share::encode_as_scannable_image;
