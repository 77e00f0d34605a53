//! Palette extraction for Swatchbook.
//!
//! Wraps the Imagga color extraction API behind a FIFO [`RequestGate`] and a
//! [`RetryPolicy`] that only retries concurrency-limit rejections. Callers
//! always get a palette back: when extraction fails, [`FallbackPalettes`]
//! supplies a curated one. [`ColormindClient`] serves random palettes with the
//! same fallback behaviour.

pub mod colormind;
pub mod error;
pub mod fallback;
pub mod gate;
pub mod image;
pub mod imagga;
pub mod retry;

pub use colormind::ColormindClient;
pub use error::{Error, Result};
pub use fallback::FallbackPalettes;
pub use gate::RequestGate;
pub use image::ImageSource;
pub use imagga::{ApiStatus, ImaggaClient, ImaggaConfig};
pub use retry::RetryPolicy;
