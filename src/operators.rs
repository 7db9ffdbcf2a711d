//! Built-in operations.
//!
//! Every operation decodes its input as a PPM, works on a [`Pixmap`] and
//! hands it back to be encoded under its own filename.

mod blur;
mod crush;
mod mosaic;

pub use blur::Blur;
pub use crush::Crush;
pub use mosaic::Mosaic;

use crate::artifact::Artifact;
use crate::error::OperationError;
use crate::interpreter::{Arguments, Operation, Output};
use crate::pixmap::Pixmap;
use crate::registry::Registry;

/// Registry holding every built-in operation.
pub fn registry() -> Registry {
    Registry::new()
        .with(Blur)
        .with(Crush)
        .with(Flip)
        .with(Grayscale)
        .with(Invert)
        .with(Mirror)
        .with(Mosaic)
}

fn decode(input: &Artifact) -> Result<Pixmap, OperationError> {
    Pixmap::decode(&input.data)
}

/// Invert operator - replaces every channel value `v` with `255 - v`.
pub struct Invert;

impl Operation for Invert {
    fn name(&self) -> &'static str {
        "invert"
    }

    fn description(&self) -> &'static str {
        "Swap every colour for its opposite."
    }

    fn apply(&self, input: &Artifact, _args: &Arguments) -> Result<Output, OperationError> {
        let mut image = decode(input)?;
        image.map_pixels(|[r, g, b]| [255 - r, 255 - g, 255 - b]);
        Ok(Output::new(image, "invert.ppm"))
    }
}

/// Grayscale operator - replaces each pixel with its luma.
pub struct Grayscale;

impl Operation for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn description(&self) -> &'static str {
        "Drain the colour out of an image."
    }

    fn apply(&self, input: &Artifact, _args: &Arguments) -> Result<Output, OperationError> {
        let mut image = decode(input)?;
        image.map_pixels(|[r, g, b]| {
            let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
            let luma = luma as u8;
            [luma, luma, luma]
        });
        Ok(Output::new(image, "grayscale.ppm"))
    }
}

/// Flip operator - turns the image upside down.
pub struct Flip;

impl Operation for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn description(&self) -> &'static str {
        "Turn an image upside down."
    }

    fn apply(&self, input: &Artifact, _args: &Arguments) -> Result<Output, OperationError> {
        let image = decode(input)?;
        let height = image.height();
        let flipped = Pixmap::from_fn(image.width(), height, |x, y| image.pixel(x, height - 1 - y));
        Ok(Output::new(flipped, "flip.ppm"))
    }
}

/// Mirror operator - reflects the image left to right.
pub struct Mirror;

impl Operation for Mirror {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn description(&self) -> &'static str {
        "Reflect an image left to right."
    }

    fn apply(&self, input: &Artifact, _args: &Arguments) -> Result<Output, OperationError> {
        let image = decode(input)?;
        let width = image.width();
        let mirrored = Pixmap::from_fn(width, image.height(), |x, y| image.pixel(width - 1 - x, y));
        Ok(Output::new(mirrored, "mirror.ppm"))
    }
}

/// Run an operation directly on a pixmap, returning the decoded result and
/// the save options it asked for.
#[cfg(test)]
pub(crate) fn run_on(
    operation: &dyn Operation,
    image: &Pixmap,
    pairs: &[(&str, i64)],
) -> Result<(Pixmap, crate::artifact::SaveOptions), OperationError> {
    use crate::interpreter::Encode;

    let data = image.encode(crate::pixmap::EXTENSION, &Default::default())?;
    let input = Artifact::new(data, "input.ppm");
    let supplied = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    let args = Arguments::bind(operation, &supplied).map_err(OperationError::Rejected)?;
    let (artifact, options) = operation.apply(&input, &args)?.encode()?;
    Ok((Pixmap::decode(&artifact.data)?, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Pixmap {
        Pixmap::from_fn(3, 2, |x, y| [(x * 100) as u8, (y * 200) as u8, 50])
    }

    #[test]
    fn registry_contains_builtins() {
        let registry = registry();
        let names: Vec<_> = registry.iter().map(|op| op.name()).collect();
        assert_eq!(
            names,
            vec!["blur", "crush", "flip", "grayscale", "invert", "mirror", "mosaic"]
        );
    }

    #[test]
    fn invert_pixels() {
        let (out, options) = run_on(&Invert, &gradient(), &[]).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 255, 205]);
        assert_eq!(out.pixel(2, 1), [55, 55, 205]);
        assert!(options.is_empty());
    }

    #[test]
    fn invert_twice_is_identity() {
        let (once, _) = run_on(&Invert, &gradient(), &[]).unwrap();
        let (twice, _) = run_on(&Invert, &once, &[]).unwrap();
        assert_eq!(twice, gradient());
    }

    #[test]
    fn grayscale_pixels() {
        let image = Pixmap::from_fn(2, 1, |x, _| if x == 0 { [255, 255, 255] } else { [255, 0, 0] });
        let (out, _) = run_on(&Grayscale, &image, &[]).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 255, 255]);
        assert_eq!(out.pixel(1, 0), [76, 76, 76]);
    }

    #[test]
    fn flip_rows() {
        let (out, _) = run_on(&Flip, &gradient(), &[]).unwrap();
        assert_eq!(out.pixel(1, 0), gradient().pixel(1, 1));
        assert_eq!(out.pixel(1, 1), gradient().pixel(1, 0));
    }

    #[test]
    fn mirror_columns() {
        let (out, _) = run_on(&Mirror, &gradient(), &[]).unwrap();
        assert_eq!(out.pixel(0, 0), gradient().pixel(2, 0));
        assert_eq!(out.pixel(1, 1), gradient().pixel(1, 1));
    }

    #[test]
    fn undeclared_argument_rejected() {
        assert!(run_on(&Invert, &gradient(), &[("amount", 3)]).is_err());
    }

    #[test]
    fn non_ppm_input_rejected() {
        let input = Artifact::new(b"GIF89a".to_vec(), "cat.gif");
        let args = Arguments::bind(&Invert, &Default::default()).unwrap();
        assert!(matches!(
            Invert.apply(&input, &args),
            Err(OperationError::Rejected(_))
        ));
    }
}
