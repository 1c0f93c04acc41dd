//! Scoring math: grading percentages, evaluation components, rolling averages,
//! and team aggregates.
//!
//! Everything that ends up persisted is an integer. Divisions truncate toward
//! zero, which for these non-negative values is the floor.

use serde::{Deserialize, Serialize};

use crate::model::UserEvaluation;

/// Minimum percentage that counts as passing a quiz.
pub const PASS_THRESHOLD: f64 = 60.0;

/// Upper bound of the quiz component of an evaluation.
pub const MAX_QUIZ_SCORE: u32 = 30;
/// Upper bound of the participation component of an evaluation.
pub const MAX_PARTICIPATION_SCORE: u32 = 20;
/// Upper bound of the quality component of an evaluation.
pub const MAX_QUALITY_SCORE: u32 = 50;

/// `100 * correct / total`, or 0 for an empty quiz.
pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * correct as f64 / total as f64
}

pub fn is_passing(percentage: f64) -> bool {
    percentage >= PASS_THRESHOLD
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quiz component: `floor(percentage / 100 * 30)`.
///
/// Computed on the raw counts so 3/5 gives exactly 18 and not 17 through
/// floating point error.
pub fn quiz_component(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    (correct as u64 * MAX_QUIZ_SCORE as u64 / total as u64) as u32
}

/// Bound a generator-provided score to `[0, max]`, truncating fractions.
/// NaN counts as 0.
pub fn clamp_component(raw: f64, max: u32) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    if raw >= max as f64 {
        return max;
    }
    raw.trunc() as u32
}

/// Incremental mean over `meetings_attended` evaluations, truncated.
///
/// `meetings_attended` includes the evaluation being added.
pub fn rolling_average(previous: u32, meetings_attended: u32, latest_total: u32) -> u32 {
    if meetings_attended <= 1 {
        return latest_total;
    }
    let n = meetings_attended as u64;
    (((n - 1) * previous as u64 + latest_total as u64) / n) as u32
}

/// Averages across all individual evaluations of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAverages {
    pub participant_count: usize,
    pub total_score: u32,
    pub quiz_score: u32,
    pub participation_score: u32,
    pub quality_score: u32,
}

/// Integer-truncated averages, or `None` when there is nothing to average.
pub fn team_averages(evaluations: &[UserEvaluation]) -> Option<TeamAverages> {
    if evaluations.is_empty() {
        return None;
    }
    let n = evaluations.len() as u64;
    let avg = |f: fn(&UserEvaluation) -> u32| -> u32 {
        (evaluations.iter().map(|e| f(e) as u64).sum::<u64>() / n) as u32
    };

    Some(TeamAverages {
        participant_count: evaluations.len(),
        total_score: avg(|e| e.total_score),
        quiz_score: avg(|e| e.quiz_score),
        participation_score: avg(|e| e.participation_score),
        quality_score: avg(|e| e.quality_score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn evaluation(total: u32, quiz: u32, participation: u32, quality: u32) -> UserEvaluation {
        UserEvaluation {
            id: 0,
            username: "u".into(),
            meeting_id: 1,
            total_score: total,
            quiz_score: quiz,
            participation_score: participation,
            quality_score: quality,
            strengths: String::new(),
            weaknesses: String::new(),
            tips: String::new(),
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_basic() {
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 5), 0.0);
        assert_eq!(percentage(3, 5), 60.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(is_passing(60.0));
        assert!(!is_passing(59.99));
        assert!(is_passing(percentage(3, 5)));
        assert!(!is_passing(percentage(2, 5)));
    }

    #[test]
    fn round2_for_display() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(60.0), 60.0);
    }

    #[test]
    fn quiz_component_floors() {
        assert_eq!(quiz_component(3, 5), 18);
        assert_eq!(quiz_component(5, 5), 30);
        assert_eq!(quiz_component(0, 5), 0);
        assert_eq!(quiz_component(1, 3), 10);
        assert_eq!(quiz_component(2, 3), 20);
        assert_eq!(quiz_component(4, 7), 17);
    }

    #[test]
    fn quiz_component_never_exceeds_max() {
        assert_eq!(quiz_component(9, 5), 30);
        assert_eq!(quiz_component(1, 0), 0);
    }

    #[test]
    fn clamp_component_bounds() {
        assert_eq!(clamp_component(999.0, MAX_PARTICIPATION_SCORE), 20);
        assert_eq!(clamp_component(-5.0, MAX_PARTICIPATION_SCORE), 0);
        assert_eq!(clamp_component(12.9, MAX_PARTICIPATION_SCORE), 12);
        assert_eq!(clamp_component(50.0, MAX_QUALITY_SCORE), 50);
        assert_eq!(clamp_component(f64::NAN, MAX_QUALITY_SCORE), 0);
        assert_eq!(clamp_component(f64::INFINITY, MAX_QUALITY_SCORE), 50);
    }

    #[test]
    fn rolling_average_first_meeting_takes_total() {
        assert_eq!(rolling_average(0, 1, 73), 73);
    }

    #[test]
    fn rolling_average_second_meeting() {
        assert_eq!(rolling_average(80, 2, 60), 70);
    }

    #[test]
    fn rolling_average_truncates() {
        // (2 * 70 + 75) / 3 = 71.67
        assert_eq!(rolling_average(70, 3, 75), 71);
    }

    #[test]
    fn team_averages_of_three_then_four() {
        let mut evals = vec![
            evaluation(90, 30, 20, 40),
            evaluation(70, 20, 10, 40),
            evaluation(80, 25, 15, 40),
        ];
        let avg = team_averages(&evals).unwrap();
        assert_eq!(avg.total_score, 80);
        assert_eq!(avg.quiz_score, 25);
        assert_eq!(avg.participation_score, 15);
        assert_eq!(avg.participant_count, 3);

        evals.push(evaluation(60, 18, 12, 30));
        let avg = team_averages(&evals).unwrap();
        assert_eq!(avg.total_score, 75);
        // (30 + 20 + 25 + 18) / 4 = 23.25
        assert_eq!(avg.quiz_score, 23);
    }

    #[test]
    fn team_averages_empty() {
        assert!(team_averages(&[]).is_none());
    }
}
