//! The `meetquiz evaluate` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use meetquiz_core::statistics::{MAX_PARTICIPATION_SCORE, MAX_QUALITY_SCORE, MAX_QUIZ_SCORE};

use super::{print_json, Paths, Workspace};

pub async fn execute(paths: &Paths, meeting_id: i64, username: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let engine = ws.engine()?;

    let report = engine.evaluate_user(meeting_id, username).await?;
    ws.save().await?;

    if json {
        return print_json(&report);
    }

    println!(
        "{} in meeting {}: {}/100",
        report.username, report.meeting_id, report.total_score
    );

    let mut table = Table::new();
    table.set_header(vec!["Component", "Score", "Max"]);
    table.add_row(vec![
        Cell::new(format!("Quiz ({:.2}%)", report.quiz_percentage)),
        Cell::new(report.quiz_score),
        Cell::new(MAX_QUIZ_SCORE),
    ]);
    table.add_row(vec![
        Cell::new(format!(
            "Participation ({} contributions, {} off-topic)",
            report.transcript_count, report.foul_count
        )),
        Cell::new(report.participation_score),
        Cell::new(MAX_PARTICIPATION_SCORE),
    ]);
    table.add_row(vec![
        Cell::new("Quality"),
        Cell::new(report.quality_score),
        Cell::new(MAX_QUALITY_SCORE),
    ]);
    println!("{table}");

    println!("Strengths:  {}", report.strengths);
    println!("Weaknesses: {}", report.weaknesses);
    println!("Tips:       {}", report.tips);
    println!(
        "Score now {} over {} meeting(s); +{} credits ({} total)",
        report.updated_user_score,
        report.meetings_attended,
        report.credits_earned,
        report.total_credits
    );
    Ok(())
}
