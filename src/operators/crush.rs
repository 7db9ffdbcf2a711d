use crate::artifact::{Artifact, SaveOptions};
use crate::error::OperationError;
use crate::interpreter::{Arguments, Operation, Output, Param};

use super::decode;

/// Crush operator - quantises every channel to `levels` values and asks the
/// encoder to store the image at that depth.
pub struct Crush;

impl Operation for Crush {
    fn name(&self) -> &'static str {
        "crush"
    }

    fn description(&self) -> &'static str {
        "Squash the colour depth until it bands."
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[Param::optional("levels", 8)];
        PARAMS
    }

    fn apply(&self, input: &Artifact, args: &Arguments) -> Result<Output, OperationError> {
        let levels = args.get("levels")?;
        if !(2..=256).contains(&levels) {
            return Err(OperationError::rejected(format!(
                "Levels must be between 2 and 256. {} provided.",
                levels
            )));
        }

        let mut image = decode(input)?;
        let steps = (levels - 1) as u32;
        image.map_pixels(|pixel| pixel.map(|v| quantise(v, steps)));

        let mut options = SaveOptions::new();
        options.insert("maxval".to_string(), i64::from(steps));
        Ok(Output::new(image, "crush.ppm").with_save_options(options))
    }
}

fn quantise(v: u8, steps: u32) -> u8 {
    let level = (u32::from(v) * steps + 127) / 255;
    ((level * 255 + steps / 2) / steps) as u8
}
