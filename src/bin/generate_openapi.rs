//! Dumps the ComfortCheck OpenAPI document as pretty JSON.
//!
//!   generate_openapi                     # to stdout
//!   generate_openapi --output api.json   # to a file
//!   generate_openapi --output=api.json

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use comfortcheck_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .context("serialising OpenAPI document")?;

    match output_path(std::env::args().skip(1))? {
        Some(path) => {
            std::fs::write(&path, &document)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => std::io::stdout()
            .lock()
            .write_all(document.as_bytes())
            .context("writing OpenAPI document to stdout")?,
    }
    Ok(())
}

fn output_path(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    while let Some(arg) = args.next() {
        if arg == "--output" {
            let path = args.next().context("--output needs a file path")?;
            return Ok(Some(PathBuf::from(path)));
        }
        if let Some(path) = arg.strip_prefix("--output=") {
            return Ok(Some(PathBuf::from(path)));
        }
        anyhow::bail!("unexpected argument {arg:?}");
    }
    Ok(None)
}
