//! List command - print the sample catalog

use eyre::Result;

use crate::samples::CATALOG;

/// Print every sample with its parameters and test table size
pub fn list_samples() -> Result<()> {
    println!("Available samples:\n");
    for sample in CATALOG {
        let signature = format!("{}({})", sample.name, sample.params.join(", "));
        let tests = match sample.tests.len() {
            0 => "no tests".to_string(),
            1 => "1 test".to_string(),
            n => format!("{n} tests"),
        };
        println!("  {signature:<24} {:<9} {}", tests, sample.description);
    }
    Ok(())
}
