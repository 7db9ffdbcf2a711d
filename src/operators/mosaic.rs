use crate::artifact::Artifact;
use crate::error::OperationError;
use crate::interpreter::{Arguments, Operation, Output, Param};
use crate::pixmap::Pixmap;

use super::decode;

const MIN_SIZE: i64 = 2;
const MAX_SIZE: i64 = 256;

/// Mosaic operator - replaces each `size` x `size` block with its average
/// colour. Blocks cut off by the right or bottom edge average what is left.
pub struct Mosaic;

impl Operation for Mosaic {
    fn name(&self) -> &'static str {
        "mosaic"
    }

    fn description(&self) -> &'static str {
        "Rebuild an image out of flat squares."
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[Param::optional("size", 8)];
        PARAMS
    }

    fn apply(&self, input: &Artifact, args: &Arguments) -> Result<Output, OperationError> {
        let size = args.get("size")?;
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(OperationError::rejected(format!(
                "Mosaic size must be between {} and {}. {} provided.",
                MIN_SIZE, MAX_SIZE, size
            )));
        }

        let image = decode(input)?;
        let size = size as usize;
        if image.width() < size || image.height() < size {
            return Err(OperationError::rejected("Image too small!"));
        }

        let averages = block_averages(&image, size);
        let columns = image.width().div_ceil(size);
        let tiled = Pixmap::from_fn(image.width(), image.height(), |x, y| {
            averages[(y / size) * columns + x / size]
        });
        Ok(Output::new(tiled, "mosaic.ppm"))
    }
}

fn block_averages(image: &Pixmap, size: usize) -> Vec<[u8; 3]> {
    let columns = image.width().div_ceil(size);
    let rows = image.height().div_ceil(size);
    let mut sums = vec![([0u64; 3], 0u64); columns * rows];

    for y in 0..image.height() {
        for x in 0..image.width() {
            let (sum, count) = &mut sums[(y / size) * columns + x / size];
            let p = image.pixel(x, y);
            for c in 0..3 {
                sum[c] += u64::from(p[c]);
            }
            *count += 1;
        }
    }

    sums.into_iter()
        .map(|(sum, count)| sum.map(|s| ((s + count / 2) / count) as u8))
        .collect()
}
