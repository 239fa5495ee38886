use std::sync::Arc;

use super::*;
use crate::db::types::UserRole;

fn service() -> PracticeService {
    PracticeService::new(Arc::new(MemoryPracticeQuizStore::new()), QuizSettings::default())
}

fn admin() -> Identity {
    Identity::new("admin-1", "Admin", UserRole::Admin)
}

fn draft(title: &str) -> PracticeDraft {
    PracticeDraft {
        title: title.to_string(),
        category: "Geography".to_string(),
        difficulty: DifficultyLevel::Easy,
        questions: ["Paris", "Rome", "Oslo"]
            .iter()
            .map(|city| Question {
                text: format!("Where is {city}?"),
                options: [
                    "France".to_string(),
                    "Italy".to_string(),
                    "Norway".to_string(),
                    "Spain".to_string(),
                ],
                correct_index: match *city {
                    "Paris" => 0,
                    "Rome" => 1,
                    _ => 2,
                },
            })
            .collect(),
    }
}

#[tokio::test]
async fn submit_grades_and_stores_result() {
    let service = service();
    let quiz = service.create(&admin(), draft("Capitals")).await.expect("create");
    let student = Identity::new("s-1", "Sam", UserRole::Student);

    let submission =
        service.submit(&quiz.id, &student, &[Some(0), Some(2), None]).await.expect("submit");
    assert_eq!(submission.result.score, 1);
    assert_eq!(submission.result.total, 3);
    assert_eq!(submission.result.percentage, 33.33);
    assert_eq!(submission.breakdown.len(), 3);
    assert!(submission.breakdown[0].is_correct);

    let results = service.list_results(&student).await.expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].answers.0, vec![Some(0), Some(2), None]);

    let other = Identity::new("s-2", "Kim", UserRole::Student);
    assert!(service.list_results(&other).await.expect("results").is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let service = service();
    service.create(&admin(), draft("First")).await.expect("first");
    service.create(&admin(), draft("Second")).await.expect("second");

    let titles: Vec<String> =
        service.list().await.expect("list").into_iter().map(|quiz| quiz.title).collect();
    assert_eq!(titles, vec!["Second".to_string(), "First".to_string()]);
}

#[tokio::test]
async fn unknown_quiz_and_bad_answers_fail() {
    let service = service();
    let student = Identity::new("s-1", "Sam", UserRole::Student);
    assert!(matches!(
        service.submit("missing", &student, &[]).await,
        Err(QuizError::NotFound("practice quiz"))
    ));

    let quiz = service.create(&admin(), draft("Capitals")).await.expect("create");
    assert!(matches!(
        service.submit(&quiz.id, &student, &[Some(0), Some(0), Some(0), Some(0)]).await,
        Err(QuizError::InvalidIndex(_))
    ));
    assert!(service.list_results(&student).await.expect("results").is_empty());
}

#[tokio::test]
async fn create_rejects_empty_drafts() {
    let service = service();
    let mut empty = draft("Capitals");
    empty.questions.clear();
    assert!(matches!(service.create(&admin(), empty).await, Err(QuizError::Invalid(_))));
    assert!(matches!(service.create(&admin(), draft("  ")).await, Err(QuizError::Invalid(_))));
}
