//! User commands.

use anyhow::Result;
use clap::Args;

use crate::config::{build_client, Config};
use crate::output::{print_table, OutputFormat, UserRow};

#[derive(Args)]
pub struct UsersArgs {
    /// User IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Print the payload exactly as the server sent it
    #[arg(long)]
    pub raw: bool,
}

pub async fn handle(args: UsersArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = build_client(config)?;

    if args.raw {
        let content = client.users().by_ids(&args.ids).await?;
        println!("{}", serde_json::to_string_pretty(&content)?);
        return Ok(());
    }

    let users = client.users().records(&args.ids).await?;
    tracing::debug!(count = users.len(), "users resolved");

    let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
    print_table(rows, format);
    Ok(())
}
