//! Image encoding for the OCR engines.
//!
//! pdfium hands us decoded `DynamicImage`s; OCR engines want encoded bytes.
//! Everything is normalised to PNG so tesseract and the vision models see the
//! same lossless pixels, whatever format the image was embedded in.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode a decoded image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Wrap encoded image bytes for a vision model request.
///
/// PNG and JPEG are sent as-is; any other format is decoded and re-encoded
/// as PNG. `detail: "high"` keeps small print legible for OCR.
pub fn to_image_data(bytes: &[u8]) -> Result<ImageData, image::ImageError> {
    let (payload, mime) = match image::guess_format(bytes)? {
        ImageFormat::Png => (bytes.to_vec(), "image/png"),
        ImageFormat::Jpeg => (bytes.to_vec(), "image/jpeg"),
        _ => (encode_png(&image::load_from_memory(bytes)?)?, "image/png"),
    };

    let b64 = STANDARD.encode(&payload);
    debug!("Encoded {} image → {} bytes base64", mime, b64.len());

    Ok(ImageData::new(b64, mime).with_detail("high"))
}
