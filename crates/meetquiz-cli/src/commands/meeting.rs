//! The `meetquiz meeting` command.

use anyhow::Result;

use super::{Paths, Workspace};

pub async fn execute(paths: &Paths, meeting_id: i64) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let view = ws.offline_engine().meeting_summary(meeting_id).await?;

    println!("Meeting {}: {}", view.meeting_id, view.meeting_name);
    match &view.generated_at {
        Some(at) => println!("Outro quiz generated {}", at.format("%Y-%m-%d %H:%M")),
        None => println!("No outro quiz yet"),
    }
    match &view.summary {
        Some(summary) => println!("\n{summary}"),
        None => println!("No summary yet (run `meetquiz summary {meeting_id}`)"),
    }
    Ok(())
}
