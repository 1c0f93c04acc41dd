//! The `meetquiz quiz` command.

use anyhow::Result;

use meetquiz_core::report::QuizView;
use meetquiz_core::QuizType;

use super::show_quiz::print_quiz;
use super::{Paths, Workspace};

pub async fn execute(paths: &Paths, meeting_id: i64, quiz_type: QuizType, json: bool) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let engine = ws.engine()?;

    let quiz = engine.get_or_create_quiz(meeting_id, quiz_type).await?;
    ws.save().await?;

    print_quiz(&QuizView::from(&quiz), json)
}
