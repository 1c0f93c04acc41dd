//! The `meetquiz team` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{print_json, Paths, Workspace};

pub async fn execute(paths: &Paths, meeting_id: i64, json: bool) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let engine = ws.engine()?;

    let report = engine.evaluate_team(meeting_id).await?;
    ws.save().await?;

    if json {
        return print_json(&report);
    }

    println!(
        "Team evaluation for {} ({} participants): {}/100",
        report.meeting_name, report.participant_count, report.avg_evaluation_score
    );

    let mut table = Table::new();
    table.set_header(vec!["Average", "Score"]);
    table.add_row(vec![Cell::new("Quiz"), Cell::new(report.avg_quiz_score)]);
    table.add_row(vec![
        Cell::new("Participation"),
        Cell::new(report.avg_participation_score),
    ]);
    table.add_row(vec![Cell::new("Quality"), Cell::new(report.avg_quality_score)]);
    println!("{table}");

    println!("Strengths:  {}", report.team_strengths);
    println!("Weaknesses: {}", report.team_weaknesses);
    println!("Tips:       {}", report.team_tips);
    Ok(())
}
