//! The `meetquiz submit` command.

use anyhow::Result;

use meetquiz_core::SubmittedAnswer;

use super::{print_json, Paths, Workspace};

pub async fn execute(
    paths: &Paths,
    quiz_id: i64,
    username: &str,
    selected: Vec<i64>,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let engine = ws.offline_engine();

    let quiz = engine.get_quiz(quiz_id).await?;
    anyhow::ensure!(
        selected.len() == quiz.questions.len(),
        "quiz {quiz_id} has {} questions, got {} answers",
        quiz.questions.len(),
        selected.len()
    );

    // Questions are stored in display order
    let answers: Vec<SubmittedAnswer> = quiz
        .questions
        .iter()
        .zip(selected)
        .map(|(question, index)| SubmittedAnswer {
            question_id: question.id,
            selected_answer_index: index,
        })
        .collect();

    let report = engine.submit_attempt(quiz_id, username, &answers).await?;
    ws.save().await?;

    if json {
        return print_json(&report);
    }

    println!(
        "{}: {}/{} ({:.2}%) {}",
        report.username,
        report.score,
        report.total_questions,
        report.percentage,
        if report.passed { "PASSED" } else { "FAILED" }
    );
    for (i, (correct, chosen)) in report
        .correct_answers
        .iter()
        .zip(&report.user_answers)
        .enumerate()
    {
        let mark = if *chosen == *correct as i64 { "ok" } else { "x" };
        println!("  Q{}: chose {chosen}, correct {correct} [{mark}]", i + 1);
    }
    println!("Attempt {} recorded", report.attempt_id);
    Ok(())
}
