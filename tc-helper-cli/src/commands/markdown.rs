//! Markdown rendering command.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args)]
pub struct MarkdownArgs {
    /// Markdown file; reads stdin when omitted
    pub file: Option<PathBuf>,
}

pub fn handle(args: MarkdownArgs) -> Result<()> {
    let source = match args.file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    print!("{}", tc_helper::markdown_to_html(&source));
    Ok(())
}
