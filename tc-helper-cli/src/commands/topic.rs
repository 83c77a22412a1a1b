//! Topic commands.

use anyhow::Result;
use clap::Args;
use tc_helper::LogDiagnostics;

use crate::config::{build_client, Config};

#[derive(Args)]
pub struct TopicArgs {
    /// Topic ID
    pub topic_id: String,
}

pub async fn handle(args: TopicArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;

    let topic = client
        .topics()
        .read(args.topic_id.as_str())
        .logger(&LogDiagnostics)
        .send()
        .await?;

    println!("{}", serde_json::to_string_pretty(&topic)?);
    Ok(())
}
