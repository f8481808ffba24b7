use std::process::ExitCode;

use anyhow::Context;
use sift_dedup::IndexBuilder;

use crate::cli::ScanArg;
use crate::report::ScanReport;

pub fn run(arg: &ScanArg) -> anyhow::Result<ExitCode> {
    let mut builder = IndexBuilder::new();
    let seed = builder
        .seed(&arg.dir)
        .with_context(|| format!("failed to scan {}", arg.dir.display()))?;

    let report = ScanReport::from(seed);
    if arg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(ExitCode::SUCCESS)
}
