//! The `meetquiz seed` command.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use meetquiz_core::store::{
    CreateMeetingParams, CreateQuizParams, CreateTranscriptParams, NewQuestion,
};
use meetquiz_core::{QuizType, Store};

use super::{Paths, Workspace};

const USERS: [&str; 4] = ["alice", "bob", "charlie", "diana"];

// (username, text, foul)
const PLANNING_TRANSCRIPTS: [(&str, &str, bool); 8] = [
    ("alice", "Good morning everyone! Let's start by reviewing our Q1 goals.", false),
    ("bob", "I think we should prioritize the mobile app improvements first.", false),
    ("charlie", "Great point Bob. We also need to address the performance issues in the dashboard.", false),
    ("alice", "Agreed. Let's allocate 40% of resources to mobile and 30% to dashboard optimization.", false),
    ("diana", "What about the API v2 migration? That's been pending for a while.", false),
    ("bob", "Good point Diana. We can dedicate the remaining 30% to API work.", false),
    ("charlie", "I'll create tickets for each initiative and assign them to the respective teams.", false),
    ("alice", "Perfect. Let's meet again next week to review progress.", false),
];

const SYNC_TRANSCRIPTS: [(&str, &str, bool); 9] = [
    ("bob", "Let's discuss the database migration issues we encountered this week.", false),
    ("charlie", "The main issue was with foreign key constraints. We had to roll back twice.", false),
    ("diana", "I recommend we add more comprehensive tests before the next migration.", false),
    ("bob", "Good idea. Let's also improve our rollback procedures.", false),
    ("diana", "Did anyone catch the match last night?", true),
    ("alice", "The CI/CD pipeline is running much faster now after the optimizations.", false),
    ("charlie", "Build times are down from 15 minutes to 6 minutes. Great work Alice.", false),
    ("bob", "Let's prioritize the authentication refactor and split it into smaller chunks.", false),
    ("alice", "I'll draft a technical proposal for the refactor by end of week.", false),
];

pub async fn execute(paths: &Paths) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let store: &dyn Store = ws.store.as_ref();

    for username in USERS {
        store
            .create_user(username)
            .await
            .with_context(|| format!("cannot seed user {username}; is the state already seeded?"))?;
    }

    let planning = store
        .create_meeting(&CreateMeetingParams {
            name: "Q1 Product Planning".into(),
            description: "Planning session for Q1 product roadmap, discussing new features and prioritization".into(),
        })
        .await?;
    add_transcripts(store, planning.id, 2, &PLANNING_TRANSCRIPTS).await?;

    let sync = store
        .create_meeting(&CreateMeetingParams {
            name: "Engineering Weekly Sync".into(),
            description: "Weekly engineering team sync to discuss technical challenges, blockers, and upcoming sprints".into(),
        })
        .await?;
    add_transcripts(store, sync.id, 1, &SYNC_TRANSCRIPTS).await?;

    let intro = store
        .create_quiz(&CreateQuizParams {
            meeting_id: planning.id,
            quiz_type: QuizType::Intro,
            summary_snapshot: None,
            questions: planning_intro_questions(),
        })
        .await?;

    ws.save().await?;

    println!("Seeded {} users: {}", USERS.len(), USERS.join(", "));
    println!(
        "Meeting {}: {} ({} transcripts)",
        planning.id,
        planning.name,
        PLANNING_TRANSCRIPTS.len()
    );
    println!(
        "Meeting {}: {} ({} transcripts)",
        sync.id,
        sync.name,
        SYNC_TRANSCRIPTS.len()
    );
    println!("Intro quiz {} for meeting {}", intro.id, planning.id);
    println!("State written to {}", ws.state_path.display());
    Ok(())
}

async fn add_transcripts(
    store: &dyn Store,
    meeting_id: i64,
    hours_ago: i64,
    lines: &[(&str, &str, bool)],
) -> Result<()> {
    let base = Utc::now() - Duration::hours(hours_ago);
    for (minute, (username, text, foul)) in lines.iter().enumerate() {
        store
            .add_transcript(&CreateTranscriptParams {
                meeting_id,
                username: username.to_string(),
                text: text.to_string(),
                timestamp: base + Duration::minutes(minute as i64),
                foul: *foul,
            })
            .await?;
    }
    Ok(())
}

/// Fixed intro quiz, so the demo works before any provider is configured.
/// Correct indices: 1, 0, 2, 3, 1.
fn planning_intro_questions() -> Vec<NewQuestion> {
    let question = |text: &str, correct: u8, answers: [&str; 4]| NewQuestion {
        text: text.to_string(),
        correct_answer_index: correct,
        answers: answers.iter().map(|a| a.to_string()).collect(),
    };

    vec![
        question(
            "What period does this planning session cover?",
            1,
            ["Q4 of last year", "Q1", "The next two weeks", "The whole year"],
        ),
        question(
            "What is the main output of a roadmap planning session?",
            0,
            [
                "A prioritized list of initiatives",
                "A hiring plan",
                "A marketing budget",
                "A release announcement",
            ],
        ),
        question(
            "Which input matters most when prioritizing features?",
            2,
            [
                "Which feature is easiest to build",
                "Alphabetical order",
                "User impact weighed against effort",
                "What competitors shipped last week",
            ],
        ),
        question(
            "How should resources be split across initiatives?",
            3,
            [
                "Evenly, regardless of priority",
                "All on one initiative",
                "Decided after the quarter ends",
                "In proportion to agreed priorities",
            ],
        ),
        question(
            "What should follow the planning session?",
            1,
            [
                "Nothing until next quarter",
                "Tickets and owners for each initiative",
                "A new planning session the next day",
                "A company-wide survey",
            ],
        ),
    ]
}
