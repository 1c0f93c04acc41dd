//! The `meetquiz summary` command.

use anyhow::Result;

use super::{Paths, Workspace};

pub async fn execute(paths: &Paths, meeting_id: i64) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let engine = ws.engine()?;

    let summary = engine.get_or_create_summary(meeting_id).await?;
    ws.save().await?;

    println!("{summary}");
    Ok(())
}
