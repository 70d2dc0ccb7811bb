use crate::context::{Context, OutputFormat};

use fav_core::Response;

use anyhow::{bail, Result};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(json) => println!("{json}"),
		Err(e) => eprintln!("Failed to serialize output: {e}"),
	}
}

/// Prints a store response, turning a failed one into an error so the process exits non-zero
pub fn respond(ctx: &Context, response: Response) -> Result<()> {
	if response.success {
		crate::print_output!(ctx, &response, |r: &Response| println!("{}", r.message));
		return Ok(());
	}

	if let OutputFormat::Json = ctx.format {
		print_json(&response);
	}

	bail!("{}", response.message)
}
