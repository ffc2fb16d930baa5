//! Image file loading and saving.
//!
//! Files are decoded through the `image` crate, which works in RGB; the
//! analysis layer works in BGR. Channel order is swapped here and
//! nowhere else.

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ImageFileError {
    #[error("failed to read image {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame of {width}x{height} px does not fit an image buffer")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Loads an image file as a BGR frame with the given stream index.
pub fn read_frame(path: &Path, index: usize) -> Result<Frame, ImageFileError> {
    let decoded = image::open(path)
        .map_err(|source| ImageFileError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();

    let (width, height) = decoded.dimensions();
    let mut data = decoded.into_raw();
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
    Ok(Frame::new(data, width, height, 3, index))
}

/// Saves a frame as an image file; the format follows the extension.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<(), ImageFileError> {
    let channels = frame.channels() as usize;
    let mut rgb = Vec::with_capacity(frame.width() as usize * frame.height() as usize * 3);
    for pixel in frame.data().chunks_exact(channels) {
        rgb.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
    }

    let image = RgbImage::from_raw(frame.width(), frame.height(), rgb).ok_or(
        ImageFileError::InvalidDimensions {
            width: frame.width(),
            height: frame.height(),
        },
    )?;
    image.save(path).map_err(|source| ImageFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
