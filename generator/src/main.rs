mod cli;

use std::fs;
use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use cli::{Cli, Emit};
use tsd_xsd::builtins::XS_NAMESPACE;
use tsd_xsd::{convert, extract_with};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level())
        .init();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let options = cli.extract_options();

    let mut output = match cli.emit {
        Emit::Schema => {
            let conversion = convert(&source, &options)
                .with_context(|| format!("no schema for {}", cli.input.display()))?;
            info!(
                elements = conversion.elements.len(),
                dropped = conversion.diagnostics.len(),
                "converted"
            );
            let text = conversion.schema.render_with(&cli.render_options());
            if cli.check {
                check(&text)?;
            }
            text
        }
        Emit::Model => {
            if cli.check {
                warn!("--check only applies to schema output");
            }
            let extraction = extract_with(&source, &options);
            serde_json::to_string_pretty(&extraction.elements)?
        }
    };
    output.push('\n');

    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(output.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}

/// Reparses emitted text as XML and checks its root.
fn check(schema: &str) -> Result<()> {
    let document =
        roxmltree::Document::parse(schema).context("emitted schema is not well-formed")?;
    let root = document.root_element();
    if !root.has_tag_name((XS_NAMESPACE, "schema")) {
        bail!("emitted document root is {:?}, not xs:schema", root.tag_name());
    }
    Ok(())
}
