//! The `meetquiz show-quiz` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use meetquiz_core::report::QuizView;

use super::{print_json, Paths, Workspace};

pub async fn execute(paths: &Paths, quiz_id: i64, json: bool) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let quiz = ws.offline_engine().get_quiz(quiz_id).await?;
    print_quiz(&QuizView::from(&quiz), json)
}

/// Print a quiz without its correct answers.
pub(super) fn print_quiz(view: &QuizView, json: bool) -> Result<()> {
    if json {
        return print_json(view);
    }

    println!(
        "Quiz {} ({} quiz for meeting {}, generated {})",
        view.id,
        view.quiz_type,
        view.meeting_id,
        view.generated_at.format("%Y-%m-%d %H:%M")
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Answers"]);
    for question in &view.questions {
        let answers = question
            .answers
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{i}) {a}"))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(question.order + 1),
            Cell::new(&question.text),
            Cell::new(answers),
        ]);
    }
    println!("{table}");
    Ok(())
}
