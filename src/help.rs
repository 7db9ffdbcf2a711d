//! Operation listing for `--list`.

use yansi::{Condition, Paint};

use crate::interpreter::Operation;
use crate::registry::Registry;

/// Width of the usage column in [`help_text`].
const USAGE_WIDTH: usize = 20;

/// One row of the listing.
pub struct HelpLine {
    pub usage: String,
    pub description: &'static str,
}

/// How to call an operation, e.g. `blur(amount: 10);`. Required arguments
/// show as `<n>`.
pub fn usage(operation: &dyn Operation) -> String {
    let args: Vec<String> = operation
        .params()
        .iter()
        .map(|param| match param.default {
            Some(default) => format!("{}: {}", param.name, default),
            None => format!("{}: <n>", param.name),
        })
        .collect();
    format!("{}({});", operation.name(), args.join(", "))
}

/// One line per registered operation, in name order.
pub fn help_lines(registry: &Registry) -> Vec<HelpLine> {
    registry
        .iter()
        .map(|op| HelpLine {
            usage: usage(op),
            description: op.description(),
        })
        .collect()
}

/// Listing with aligned columns. The heading is bold and the usage column
/// cyan whenever `colour` holds.
pub fn help_text(registry: &Registry, colour: Condition) -> String {
    let mut out = format!("{}\n", "Operations:".bold().whenever(colour));
    for line in help_lines(registry) {
        let usage = format!("{:<width$}", line.usage, width = USAGE_WIDTH);
        out.push_str(&format!(
            "  {} {}\n",
            usage.cyan().whenever(colour),
            line.description
        ));
    }
    out
}
