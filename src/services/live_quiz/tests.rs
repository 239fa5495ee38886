use std::sync::Arc;

use super::*;
use crate::core::config::QuizSettings;
use crate::db::types::UserRole;

fn service() -> LiveQuizService {
    LiveQuizService::new(Arc::new(MemoryLiveQuizStore::new()), QuizSettings::default())
}

fn host() -> Identity {
    Identity::new("teacher-1", "Ms. Rivera", UserRole::Teacher)
}

fn student(id: &str) -> Identity {
    Identity::new(id, format!("Student {id}"), UserRole::Student)
}

fn question(text: &str, correct_index: u8) -> Question {
    Question {
        text: text.to_string(),
        options: ["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
        correct_index,
    }
}

fn draft(capacity: i32) -> QuizDraft {
    QuizDraft {
        title: "Fractions warm-up".to_string(),
        questions: vec![question("1/2 + 1/4?", 2), question("2/3 of 9?", 1)],
        max_participants: capacity,
        question_time_seconds: 30,
    }
}

async fn participant_count(service: &LiveQuizService, quiz_id: &str) -> usize {
    service.host_view(quiz_id, &host()).await.expect("host view").participants.len()
}

async fn score_of(service: &LiveQuizService, quiz_id: &str, who: &Identity) -> i32 {
    service.participant_view(quiz_id, who).await.expect("room").participant.participant.score
}

#[tokio::test]
async fn create_starts_waiting_with_code() {
    let service = service();
    let quiz = service.create(&host(), draft(30)).await.expect("create");

    assert_eq!(quiz.status, LiveQuizStatus::Waiting);
    assert_eq!(quiz.current_question, 0);
    assert_eq!(quiz.code.len(), 8);
    assert_eq!(quiz.code, quiz.code.to_uppercase());
    assert_eq!(quiz.host_id, "teacher-1");
}

#[tokio::test]
async fn create_rejects_invalid_drafts() {
    let service = service();

    let mut empty = draft(10);
    empty.questions.clear();
    assert!(matches!(service.create(&host(), empty).await, Err(QuizError::Invalid(_))));

    assert!(matches!(service.create(&host(), draft(0)).await, Err(QuizError::Invalid(_))));
    assert!(matches!(service.create(&host(), draft(501)).await, Err(QuizError::Invalid(_))));

    let mut bad_index = draft(10);
    bad_index.questions[1].correct_index = 4;
    assert!(matches!(service.create(&host(), bad_index).await, Err(QuizError::InvalidIndex(_))));
}

#[tokio::test]
async fn join_is_case_insensitive_and_idempotent() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let alice = student("alice");

    let first =
        service.join(&format!("  {} ", quiz.code.to_lowercase()), &alice).await.expect("join");
    assert!(first.newly_joined);
    assert_eq!(first.quiz.id, quiz.id);
    assert_eq!(first.participant.score, 0);
    assert_eq!(first.participant.join_order, 1);
    assert_eq!(participant_count(&service, &quiz.id).await, 1);

    let again = service.join(&quiz.code, &alice).await.expect("rejoin");
    assert!(!again.newly_joined);
    assert_eq!(participant_count(&service, &quiz.id).await, 1);

    service.join(&quiz.code, &student("bob")).await.expect("join bob");
    assert_eq!(participant_count(&service, &quiz.id).await, 2);
}

#[tokio::test]
async fn join_unknown_code_is_not_found() {
    let service = service();
    let err = service.join("NOPE1234", &student("alice")).await.unwrap_err();
    assert!(matches!(err, QuizError::NotFound("quiz")));
}

#[tokio::test]
async fn join_past_capacity_is_full_and_leaves_count() {
    let service = service();
    let quiz = service.create(&host(), draft(2)).await.expect("create");

    service.join(&quiz.code, &student("a")).await.expect("a");
    service.join(&quiz.code, &student("b")).await.expect("b");

    for _ in 0..3 {
        let err = service.join(&quiz.code, &student("c")).await.unwrap_err();
        assert!(matches!(err, QuizError::Full { capacity: 2 }));
        assert_eq!(participant_count(&service, &quiz.id).await, 2);
    }
}

#[tokio::test]
async fn late_joins_are_admitted_until_stop() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let alice = student("alice");
    service.join(&quiz.code, &alice).await.expect("join");
    service.start(&quiz.id, &host()).await.expect("start");

    let late = service.join(&quiz.code, &student("late")).await.expect("join while active");
    assert!(late.newly_joined);
    assert_eq!(late.participant.join_order, 2);
    assert!(!service.join(&quiz.code, &alice).await.expect("rejoin").newly_joined);

    service.pause(&quiz.id, &host()).await.expect("pause");
    let paused = service.join(&quiz.code, &student("paused")).await.expect("join while paused");
    assert!(paused.newly_joined);
    assert_eq!(participant_count(&service, &quiz.id).await, 3);

    service.stop(&quiz.id, &host()).await.expect("stop");
    let err = service.join(&quiz.code, &student("later")).await.unwrap_err();
    assert!(matches!(err, QuizError::AlreadyStopped));
    assert!(!service.join(&quiz.code, &alice).await.expect("rejoin after stop").newly_joined);
    assert_eq!(participant_count(&service, &quiz.id).await, 3);
}

#[tokio::test]
async fn capacity_two_scenario() {
    let service = service();
    let quiz = service.create(&host(), draft(2)).await.expect("create");
    let a = student("a");
    let b = student("b");

    service.join(&quiz.code, &a).await.expect("a joins");
    service.start(&quiz.id, &host()).await.expect("start");
    let first = service.submit(&quiz.id, &a, 0, 2).await.expect("q0");
    assert_eq!(first, SubmitOutcome { correct: true, points: 100, score: 100 });

    service.advance(&quiz.id, &host()).await.expect("advance");
    let second = service.submit(&quiz.id, &a, 1, 3).await.expect("q1");
    assert_eq!(second, SubmitOutcome { correct: false, points: 0, score: 100 });
    assert_eq!(score_of(&service, &quiz.id, &a).await, 100);

    let joined = service.join(&quiz.code, &b).await.expect("b joins");
    assert!(joined.newly_joined);
    assert_eq!(participant_count(&service, &quiz.id).await, 2);

    let err = service.join(&quiz.code, &student("c")).await.unwrap_err();
    assert!(matches!(err, QuizError::Full { capacity: 2 }));
    assert_eq!(participant_count(&service, &quiz.id).await, 2);
    assert_eq!(score_of(&service, &quiz.id, &b).await, 0);
}

#[tokio::test]
async fn duplicate_submission_is_rejected_without_scoring() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");
    service.join(&quiz.code, &a).await.expect("join");
    service.start(&quiz.id, &host()).await.expect("start");

    service.submit(&quiz.id, &a, 0, 2).await.expect("first");
    let err = service.submit(&quiz.id, &a, 0, 2).await.unwrap_err();
    assert!(matches!(err, QuizError::AlreadyAnswered(0)));
    let err = service.submit(&quiz.id, &a, 0, 1).await.unwrap_err();
    assert!(matches!(err, QuizError::AlreadyAnswered(0)));

    assert_eq!(score_of(&service, &quiz.id, &a).await, 100);
    let room = service.participant_view(&quiz.id, &a).await.expect("room");
    assert_eq!(room.participant.answers.len(), 1);
}

#[tokio::test]
async fn advance_without_answers_keeps_scores() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");
    service.join(&quiz.code, &a).await.expect("join");
    service.start(&quiz.id, &host()).await.expect("start");

    let advanced = service.advance(&quiz.id, &host()).await.expect("advance");
    assert_eq!(advanced.current_question, 1);
    assert_eq!(advanced.status, LiveQuizStatus::Active);
    assert_eq!(score_of(&service, &quiz.id, &a).await, 0);

    let err = service.advance(&quiz.id, &host()).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidIndex(_)));
}

#[tokio::test]
async fn submit_after_stop_is_already_stopped() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");
    service.join(&quiz.code, &a).await.expect("join");
    service.start(&quiz.id, &host()).await.expect("start");
    service.stop(&quiz.id, &host()).await.expect("stop");

    for (question_index, option) in [(0, 2), (1, 0), (7, 9)] {
        let err = service.submit(&quiz.id, &a, question_index, option).await.unwrap_err();
        assert!(matches!(err, QuizError::AlreadyStopped));
    }
    assert!(matches!(service.stop(&quiz.id, &host()).await, Err(QuizError::AlreadyStopped)));
}

#[tokio::test]
async fn submit_validation_order() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");

    let err = service.submit("missing", &a, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::NotFound("quiz")));

    let err = service.submit(&quiz.id, &a, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::NotFound("participant")));

    service.join(&quiz.code, &a).await.expect("join");
    let err = service.submit(&quiz.id, &a, 5, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidIndex(_)));
    let err = service.submit(&quiz.id, &a, -1, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidIndex(_)));
    let err = service.submit(&quiz.id, &a, 0, 4).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidIndex(_)));

    let err = service.submit(&quiz.id, &a, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidState { status: LiveQuizStatus::Waiting, .. }));

    service.start(&quiz.id, &host()).await.expect("start");
    let err = service.submit(&quiz.id, &a, 1, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::QuestionClosed { requested: 1, current: 0 }));

    service.pause(&quiz.id, &host()).await.expect("pause");
    let err = service.submit(&quiz.id, &a, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::InvalidState { status: LiveQuizStatus::Paused, .. }));

    service.resume(&quiz.id, &host()).await.expect("resume");
    let outcome = service.submit(&quiz.id, &a, 0, 0).await.expect("submit");
    assert!(!outcome.correct);
}

#[tokio::test]
async fn host_only_operations_reject_others() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let intruder = Identity::new("teacher-2", "Mr. Chen", UserRole::Teacher);

    for transition in [Transition::Start, Transition::Stop] {
        let err = service.transition(&quiz.id, &intruder, transition).await.unwrap_err();
        assert!(matches!(err, QuizError::NotAuthorized(_)));
    }
    assert!(matches!(service.stats(&quiz.id, &intruder).await, Err(QuizError::NotAuthorized(_))));
    assert!(matches!(
        service.host_view(&quiz.id, &intruder).await,
        Err(QuizError::NotAuthorized(_))
    ));
    assert!(matches!(
        service.leaderboard(&quiz.id, &intruder).await,
        Err(QuizError::NotAuthorized(_))
    ));
    assert!(matches!(service.start("missing", &host()).await, Err(QuizError::NotFound("quiz"))));
}

#[tokio::test]
async fn stats_track_current_question() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let students: Vec<Identity> = ["a", "b", "c"].into_iter().map(student).collect();
    for who in &students {
        service.join(&quiz.code, who).await.expect("join");
    }
    service.start(&quiz.id, &host()).await.expect("start");

    service.submit(&quiz.id, &students[0], 0, 2).await.expect("a");
    service.submit(&quiz.id, &students[1], 0, 2).await.expect("b");

    let stats = service.stats(&quiz.id, &host()).await.expect("stats");
    assert_eq!(stats.question_index, 0);
    assert_eq!(stats.answer_counts, [0, 0, 2, 0]);
    assert_eq!(stats.total_participants, 3);
    assert_eq!(stats.total_answered, 2);

    service.advance(&quiz.id, &host()).await.expect("advance");
    let stats = service.stats(&quiz.id, &host()).await.expect("stats");
    assert_eq!(stats.question_number, 2);
    assert_eq!(stats.total_answered, 0);
}

#[tokio::test]
async fn leaderboard_visible_to_participants() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");
    let b = student("b");
    service.join(&quiz.code, &a).await.expect("a");
    service.join(&quiz.code, &b).await.expect("b");
    service.start(&quiz.id, &host()).await.expect("start");
    service.submit(&quiz.id, &b, 0, 2).await.expect("b answers");

    let board = service.leaderboard(&quiz.id, &a).await.expect("leaderboard");
    let names: Vec<&str> = board.entries.iter().map(|entry| entry.user_id.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(board.entries[0].score, 100);
    assert_eq!(board.entries[1].rank, 2);
}

#[tokio::test]
async fn list_hosted_returns_own_quizzes() {
    let service = service();
    service.create(&host(), draft(5)).await.expect("first");
    service.create(&host(), draft(5)).await.expect("second");
    let other = Identity::new("teacher-2", "Mr. Chen", UserRole::Teacher);
    service.create(&other, draft(5)).await.expect("other");

    let hosted = service.list_hosted(&host()).await.expect("list");
    assert_eq!(hosted.len(), 2);
    assert!(hosted.iter().all(|quiz| quiz.host_id == "teacher-1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_overbook() {
    let service = service();
    let quiz = service.create(&host(), draft(10)).await.expect("create");

    let mut handles = Vec::new();
    for i in 0..40 {
        let service = service.clone();
        let code = quiz.code.clone();
        handles.push(tokio::spawn(async move {
            service.join(&code, &student(&format!("s{i}"))).await
        }));
    }

    let mut admitted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(outcome) if outcome.newly_joined => admitted += 1,
            Err(QuizError::Full { .. }) => full += 1,
            other => panic!("unexpected join result: {other:?}"),
        }
    }

    assert_eq!(admitted, 10);
    assert_eq!(full, 30);
    let view = service.host_view(&quiz.id, &host()).await.expect("view");
    let mut orders: Vec<i32> =
        view.participants.iter().map(|record| record.participant.join_order).collect();
    orders.sort_unstable();
    assert_eq!(orders, (1..=10).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_submissions_score_once() {
    let service = service();
    let quiz = service.create(&host(), draft(5)).await.expect("create");
    let a = student("a");
    service.join(&quiz.code, &a).await.expect("join");
    service.start(&quiz.id, &host()).await.expect("start");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let quiz_id = quiz.id.clone();
        let who = a.clone();
        handles.push(tokio::spawn(async move { service.submit(&quiz_id, &who, 0, 2).await }));
    }

    let mut recorded = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) => recorded += 1,
            Err(QuizError::AlreadyAnswered(0)) => {}
            Err(other) => panic!("unexpected submit error: {other}"),
        }
    }

    assert_eq!(recorded, 1);
    assert_eq!(score_of(&service, &quiz.id, &a).await, 100);
}
