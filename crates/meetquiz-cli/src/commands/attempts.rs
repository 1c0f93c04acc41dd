//! The `meetquiz attempts` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use meetquiz_core::statistics::{percentage, round2};

use super::{Paths, Workspace};

pub async fn execute(paths: &Paths, username: &str, quiz_id: Option<i64>) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let attempts = ws.offline_engine().list_attempts(username, quiz_id).await?;

    if attempts.is_empty() {
        println!("No attempts by {username}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Attempt", "Quiz", "Score", "Percent", "Completed"]);
    for attempt in &attempts {
        table.add_row(vec![
            Cell::new(attempt.id),
            Cell::new(attempt.quiz_id),
            Cell::new(format!("{}/{}", attempt.score, attempt.total_questions)),
            Cell::new(format!(
                "{:.2}%",
                round2(percentage(attempt.score, attempt.total_questions))
            )),
            Cell::new(attempt.completed_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    println!("{table}");
    Ok(())
}
