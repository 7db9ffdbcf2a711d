use crate::artifact::Artifact;
use crate::error::OperationError;
use crate::interpreter::{Arguments, Operation, Output, Param};
use crate::pixmap::Pixmap;

use super::decode;

const MAX_AMOUNT: i64 = 50;

/// Blur operator - box blur with a radius of `amount` pixels.
///
/// Runs one horizontal and one vertical pass; pixels past the edge are
/// clamped to the nearest edge pixel.
pub struct Blur;

impl Operation for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn description(&self) -> &'static str {
        "Soften an image with a box blur."
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[Param::optional("amount", 10)];
        PARAMS
    }

    fn apply(&self, input: &Artifact, args: &Arguments) -> Result<Output, OperationError> {
        let amount = args.get("amount")?;
        if !(0..=MAX_AMOUNT).contains(&amount) {
            return Err(OperationError::rejected(format!(
                "Blur amount must be between 0 and {}. {} provided.",
                MAX_AMOUNT, amount
            )));
        }

        let image = decode(input)?;
        let radius = amount as usize;
        let horizontal = box_pass(&image, radius, Axis::Horizontal);
        let blurred = box_pass(&horizontal, radius, Axis::Vertical);
        Ok(Output::new(blurred, "blur.ppm"))
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn box_pass(image: &Pixmap, radius: usize, axis: Axis) -> Pixmap {
    if radius == 0 {
        return image.clone();
    }
    let (width, height) = (image.width(), image.height());
    let window = (2 * radius + 1) as u32;

    Pixmap::from_fn(width, height, |x, y| {
        let mut sum = [0u32; 3];
        for offset in 0..=2 * radius {
            let (sx, sy) = match axis {
                Axis::Horizontal => ((x + offset).saturating_sub(radius).min(width - 1), y),
                Axis::Vertical => (x, (y + offset).saturating_sub(radius).min(height - 1)),
            };
            let p = image.pixel(sx, sy);
            for c in 0..3 {
                sum[c] += u32::from(p[c]);
            }
        }
        sum.map(|s| ((s + window / 2) / window) as u8)
    })
}
