//! In-memory RGB image and the binary PPM (P6) format used to move it
//! between pipeline steps.

use winnow::ModalResult;
use winnow::ascii::{dec_uint, multispace1};
use winnow::combinator::{alt, repeat};
use winnow::prelude::*;
use winnow::token::{one_of, take_till};

use crate::artifact::SaveOptions;
use crate::error::OperationError;
use crate::interpreter::Encode;

/// Extension the built-in operations write.
pub const EXTENSION: &str = "ppm";

/// An 8-bit RGB image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Build an image by evaluating `f` at every `(x, y)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Apply `f` to every pixel in place.
    pub fn map_pixels(&mut self, mut f: impl FnMut([u8; 3]) -> [u8; 3]) {
        for chunk in self.pixels.chunks_exact_mut(3) {
            let out = f([chunk[0], chunk[1], chunk[2]]);
            chunk.copy_from_slice(&out);
        }
    }

    /// Decode a binary PPM. Samples with a maxval below 255 are rescaled to
    /// the full 8-bit range.
    pub fn decode(data: &[u8]) -> Result<Self, OperationError> {
        let mut input = data;
        let (width, height, maxval) = header
            .parse_next(&mut input)
            .map_err(|_| OperationError::rejected("Input is not a binary PPM (P6) image!"))?;

        if width == 0 || height == 0 {
            return Err(OperationError::rejected("Image has no pixels!"));
        }
        if maxval == 0 || maxval > 255 {
            return Err(OperationError::rejected(
                "Only 8-bit PPM images are supported!",
            ));
        }

        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| OperationError::rejected("Image is too large!"))?;
        if input.len() < len {
            return Err(OperationError::rejected("Image data is truncated!"));
        }

        let maxval = u32::from(maxval);
        let pixels = input[..len]
            .iter()
            .map(|&v| ((u32::from(v).min(maxval) * 255 + maxval / 2) / maxval) as u8)
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

impl Encode for Pixmap {
    /// Write a binary PPM. The `maxval` save option (1..=255) reduces the
    /// number of levels per channel.
    fn encode(&self, ext: &str, options: &SaveOptions) -> Result<Vec<u8>, OperationError> {
        if ext != EXTENSION {
            return Err(OperationError::failed(format!(
                "cannot encode a pixmap as '{}'",
                ext
            )));
        }
        let maxval = options.get("maxval").copied().unwrap_or(255);
        if !(1..=255).contains(&maxval) {
            return Err(OperationError::failed(format!(
                "maxval {} out of range",
                maxval
            )));
        }

        let maxval = maxval as u32;
        let mut out = format!("P6\n{} {}\n{}\n", self.width, self.height, maxval).into_bytes();
        out.reserve(self.pixels.len());
        out.extend(
            self.pixels
                .iter()
                .map(|&v| ((u32::from(v) * maxval + 127) / 255) as u8),
        );
        Ok(out)
    }
}

/// Parser for `P6 <width> <height> <maxval>` followed by one whitespace byte.
fn header(input: &mut &[u8]) -> ModalResult<(usize, usize, u16)> {
    one_of(b'P').parse_next(input)?;
    one_of(b'6').parse_next(input)?;
    gap.parse_next(input)?;
    let width: usize = dec_uint.parse_next(input)?;
    gap.parse_next(input)?;
    let height: usize = dec_uint.parse_next(input)?;
    gap.parse_next(input)?;
    let maxval: u16 = dec_uint.parse_next(input)?;
    one_of(|b: u8| b.is_ascii_whitespace()).parse_next(input)?;
    Ok((width, height, maxval))
}

/// Whitespace and `#` comments between header fields.
fn gap(input: &mut &[u8]) -> ModalResult<()> {
    let _: () = repeat(1.., alt((whitespace, comment))).parse_next(input)?;
    Ok(())
}

fn whitespace(input: &mut &[u8]) -> ModalResult<()> {
    let _: &[u8] = multispace1.parse_next(input)?;
    Ok(())
}

fn comment(input: &mut &[u8]) -> ModalResult<()> {
    one_of(b'#').parse_next(input)?;
    let _: &[u8] = take_till(0.., b'\n').parse_next(input)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Pixmap {
        Pixmap::from_fn(2, 2, |x, y| if (x + y) % 2 == 0 { [255, 0, 0] } else { [0, 0, 255] })
    }

    #[test]
    fn encode_header_and_samples() {
        let bytes = checker().encode("ppm", &SaveOptions::new()).unwrap();
        assert!(bytes.starts_with(b"P6\n2 2\n255\n"));
        assert_eq!(bytes.len(), 11 + 12);
        assert_eq!(&bytes[11..14], &[255, 0, 0]);
    }

    #[test]
    fn decode_what_was_encoded() {
        let image = checker();
        let bytes = image.encode("ppm", &SaveOptions::new()).unwrap();
        assert_eq!(Pixmap::decode(&bytes).unwrap(), image);
    }

    #[test]
    fn decode_with_comments() {
        let mut data = b"P6\n# made by hand\n1 1 # trailing\n255\n".to_vec();
        data.extend_from_slice(&[10, 20, 30]);
        let image = Pixmap::decode(&data).unwrap();
        assert_eq!(image.width(), 1);
        assert_eq!(image.pixel(0, 0), [10, 20, 30]);
    }

    #[test]
    fn decode_rescales_low_maxval() {
        let mut data = b"P6 1 1 1\n".to_vec();
        data.extend_from_slice(&[1, 0, 1]);
        let image = Pixmap::decode(&data).unwrap();
        assert_eq!(image.pixel(0, 0), [255, 0, 255]);
    }

    #[test]
    fn decode_rejects_other_formats() {
        let err = Pixmap::decode(b"\x89PNG\r\n\x1a\n").unwrap_err();
        assert!(matches!(err, OperationError::Rejected(_)));
        assert!(Pixmap::decode(b"P3\n1 1\n255\n0 0 0").is_err());
    }

    #[test]
    fn decode_rejects_truncated_data() {
        let err = Pixmap::decode(b"P6\n2 2\n255\n\x00\x00\x00").unwrap_err();
        assert_eq!(err, OperationError::rejected("Image data is truncated!"));
    }

    #[test]
    fn decode_rejects_sixteen_bit() {
        let err = Pixmap::decode(b"P6\n1 1\n65535\n\x00\x00\x00\x00\x00\x00").unwrap_err();
        assert_eq!(err, OperationError::rejected("Only 8-bit PPM images are supported!"));
    }

    #[test]
    fn decode_rejects_empty_image() {
        assert!(Pixmap::decode(b"P6\n0 4\n255\n").is_err());
    }

    #[test]
    fn encode_with_maxval() {
        let image = Pixmap::from_fn(1, 1, |_, _| [255, 128, 0]);
        let mut options = SaveOptions::new();
        options.insert("maxval".to_string(), 3);
        let bytes = image.encode("ppm", &options).unwrap();
        assert!(bytes.starts_with(b"P6\n1 1\n3\n"));
        assert_eq!(&bytes[9..], &[3, 2, 0]);
    }

    #[test]
    fn encode_rejects_other_extensions() {
        let err = checker().encode("png", &SaveOptions::new()).unwrap_err();
        assert!(matches!(err, OperationError::Failed(_)));
    }

    #[test]
    fn map_pixels_in_place() {
        let mut image = checker();
        image.map_pixels(|[r, g, b]| [b, g, r]);
        assert_eq!(image.pixel(0, 0), [0, 0, 255]);
        assert_eq!(image.pixel(1, 0), [255, 0, 0]);
    }
}
