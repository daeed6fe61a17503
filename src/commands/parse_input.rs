//! `parse-input`: validate a run's JSON payload and stage a clean copy

use crate::cli::ParseInputArgs;
use crate::error::Result;
use crate::input;

pub fn run(args: ParseInputArgs) -> Result<()> {
    let parsed = input::validate(&args.json, &args.required_fields)?;
    input::write_clean(&parsed, &args.output_path)?;
    println!("{}", parsed.summary);
    Ok(())
}
