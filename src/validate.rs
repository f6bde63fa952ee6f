//! `tea validate`: check technique data without writing anything.

use anyhow::{bail, Result};

use tea_techniques_core::validate::validate_records;

use crate::config::Config;
use crate::load::load_records;

pub fn run_validate(config: &Config, strict: bool) -> Result<()> {
    let catalog = config.catalog()?;
    let input = load_records(config)?;
    let report = validate_records(&input.records, &catalog.hierarchy, &catalog.goals);

    print!("{}", report);
    println!(
        "Checked {} records in {} file(s): {} error(s), {} warning(s)",
        report.records,
        input.files.len(),
        report.errors.len(),
        report.warnings.len()
    );

    if !report.is_ok() {
        bail!("validation failed with {} error(s)", report.errors.len());
    }
    if strict && !report.warnings.is_empty() {
        bail!(
            "validation failed in strict mode with {} warning(s)",
            report.warnings.len()
        );
    }
    Ok(())
}
