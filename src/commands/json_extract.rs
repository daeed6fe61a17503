//! `json-extract`: pull one value out of JSON piped through stdin
//!
//! Exits 0 and prints nothing on any failure so shell pipelines can treat
//! missing values as empty strings.

use crate::cli::JsonExtractArgs;
use crate::error::Result;
use crate::jsonpath;
use std::io::{Read, Write};

pub fn run(args: JsonExtractArgs) -> Result<()> {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        return Ok(());
    }

    if let Some(value) = jsonpath::extract(&input, &args.expression) {
        // No trailing newline: the value is usually captured into a variable.
        print!("{value}");
        let _ = std::io::stdout().flush();
    }
    Ok(())
}
