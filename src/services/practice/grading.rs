use crate::db::models::{Question, OPTION_COUNT};
use crate::services::live_quiz::QuizError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradedAnswer {
    pub(crate) question_index: usize,
    pub(crate) chosen: Option<u8>,
    pub(crate) correct_index: u8,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Grade {
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) percentage: f64,
    /// One entry per question; missing answers are padded with `None`.
    pub(crate) answers: Vec<Option<u8>>,
    pub(crate) breakdown: Vec<GradedAnswer>,
}

/// Grades a practice attempt. Unanswered questions count as incorrect.
pub(crate) fn grade(questions: &[Question], answers: &[Option<i32>]) -> Result<Grade, QuizError> {
    if answers.len() > questions.len() {
        return Err(QuizError::InvalidIndex(format!(
            "{} answers submitted for {} questions",
            answers.len(),
            questions.len()
        )));
    }

    let mut chosen_answers = Vec::with_capacity(questions.len());
    let mut breakdown = Vec::with_capacity(questions.len());
    let mut score = 0i32;

    for (question_index, question) in questions.iter().enumerate() {
        let chosen = match answers.get(question_index).copied().flatten() {
            None => None,
            Some(option) => Some(
                u8::try_from(option)
                    .ok()
                    .filter(|option| usize::from(*option) < OPTION_COUNT)
                    .ok_or_else(|| {
                        QuizError::InvalidIndex(format!(
                            "answer {option} for question {question_index} is outside 0-{}",
                            OPTION_COUNT - 1
                        ))
                    })?,
            ),
        };

        let is_correct = chosen == Some(question.correct_index);
        if is_correct {
            score += 1;
        }
        chosen_answers.push(chosen);
        breakdown.push(GradedAnswer {
            question_index,
            chosen,
            correct_index: question.correct_index,
            is_correct,
        });
    }

    let total = i32::try_from(questions.len()).unwrap_or(i32::MAX);
    Ok(Grade { score, total, percentage: percentage(score, total), answers: chosen_answers, breakdown })
}

fn percentage(score: i32, total: i32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(score) / f64::from(total) * 100.0;
    (raw * 100.0).round() / 100.0
}
