use crate::error::{Error, Result};

#[cfg(feature = "encode")]
use image::{Rgb, RgbImage};

#[cfg(feature = "decode")]
use image::{DynamicImage, GrayImage};

#[cfg(feature = "encode")]
use qrcode::{EcLevel, QrCode};

#[cfg(feature = "decode")]
use rqrr::PreparedImage;

use std::path::Path;

/// Pixels per QR module in written images.
pub const PIXEL_SCALE: u32 = 4;

#[cfg(feature = "encode")]
pub const EC_LEVEL: EcLevel = EcLevel::M;

#[cfg(feature = "encode")]
pub fn generate_qr_image(data: &[u8]) -> Result<RgbImage> {
    let code = QrCode::with_error_correction_level(data, EC_LEVEL)
        .map_err(|e| Error::Qr(format!("failed to create QR code: {}", e)))?;

    let image = code
        .render::<Rgb<u8>>()
        .quiet_zone(true)
        .module_dimensions(PIXEL_SCALE, PIXEL_SCALE)
        .build();

    Ok(image)
}

#[cfg(feature = "encode")]
pub fn save_qr_image(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path)?;
    Ok(())
}

#[cfg(feature = "decode")]
pub fn decode_qr_image(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path)?;
    decode_qr_from_dynamic_image(&img)
}

#[cfg(feature = "decode")]
pub fn decode_qr_from_dynamic_image(img: &DynamicImage) -> Result<Vec<u8>> {
    decode_qr_from_gray(img.to_luma8())
}

/// Decode the first readable QR code in `gray`.
///
/// Every detected grid is tried in turn. If none decodes, the image is
/// inverted and scanned again, which picks up light-on-dark codes from
/// screenshots or photographed screens.
#[cfg(feature = "decode")]
pub fn decode_qr_from_gray(gray: GrayImage) -> Result<Vec<u8>> {
    let first_error = match scan_grids(gray.clone()) {
        Ok(content) => return Ok(content),
        Err(e) => e,
    };

    let mut inverted = gray;
    image::imageops::invert(&mut inverted);
    scan_grids(inverted).map_err(|_| first_error)
}

#[cfg(feature = "decode")]
fn scan_grids(gray: GrayImage) -> Result<Vec<u8>> {
    let mut prepared = PreparedImage::prepare(gray);
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(Error::Qr("no QR code found in image".into()));
    }

    let mut failure = None;
    for grid in &grids {
        match grid.decode() {
            Ok((_, content)) => return Ok(content.into_bytes()),
            Err(e) => failure = Some(e),
        }
    }

    Err(Error::Qr(format!(
        "found {} QR code(s) but none decoded: {:?}",
        grids.len(),
        failure
    )))
}
