//! Validate command

use anyhow::Result;
use camino::Utf8Path;

use super::load_catalogue;
use crate::cli::ValidateArgs;
use crate::output;

pub fn run(args: ValidateArgs, catalogue_path: &Utf8Path) -> Result<i32> {
    let catalogue = load_catalogue(catalogue_path)?;
    let report = catalogue.validate();

    for warning in &report.warnings {
        output::warning(warning);
    }
    for error in &report.errors {
        output::error(error);
    }

    let failed = !report.is_valid() || (args.strict && !report.warnings.is_empty());
    if failed {
        output::error(&format!(
            "{} is invalid: {} error(s), {} warning(s)",
            catalogue_path,
            report.errors.len(),
            report.warnings.len()
        ));
        return Ok(1);
    }

    output::success(&format!(
        "{} is valid ({} extensions)",
        catalogue_path,
        catalogue.len()
    ));
    output::kv("Warnings", &report.warnings.len().to_string());
    Ok(0)
}
