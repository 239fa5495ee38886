use crate::db::models::OPTION_COUNT;

use super::store::ParticipantRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiveStats {
    pub(crate) question_index: i32,
    pub(crate) question_number: i32,
    pub(crate) answer_counts: [u32; OPTION_COUNT],
    pub(crate) total_participants: u32,
    pub(crate) total_answered: u32,
}

/// Tallies answers to `question_index`. Each participant contributes at most
/// one answer: the first record stored for that question.
pub(crate) fn live_stats(question_index: i32, participants: &[ParticipantRecord]) -> LiveStats {
    let mut answer_counts = [0u32; OPTION_COUNT];
    let mut total_answered = 0u32;

    for record in participants {
        let Some(answer) = record.answer_for(question_index) else {
            continue;
        };
        let Some(bucket) =
            usize::try_from(answer.chosen_option).ok().and_then(|option| answer_counts.get_mut(option))
        else {
            continue;
        };
        *bucket += 1;
        total_answered += 1;
    }

    LiveStats {
        question_index,
        question_number: question_index + 1,
        answer_counts,
        total_participants: u32::try_from(participants.len()).unwrap_or(u32::MAX),
        total_answered,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LeaderboardEntry {
    pub(crate) rank: u32,
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) score: i32,
    pub(crate) answered: u32,
}

/// Orders by score (highest first), then by who joined first. Equal scores
/// share a rank and the next distinct score skips ahead ("1, 1, 3").
pub(crate) fn leaderboard(participants: &[ParticipantRecord]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&ParticipantRecord> = participants.iter().collect();
    ordered.sort_by(|a, b| {
        b.participant
            .score
            .cmp(&a.participant.score)
            .then_with(|| a.participant.join_order.cmp(&b.participant.join_order))
    });

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(ordered.len());
    for (position, record) in ordered.into_iter().enumerate() {
        let position = u32::try_from(position + 1).unwrap_or(u32::MAX);
        let rank = match entries.last() {
            Some(previous) if previous.score == record.participant.score => previous.rank,
            _ => position,
        };
        entries.push(LeaderboardEntry {
            rank,
            user_id: record.participant.user_id.clone(),
            display_name: record.participant.display_name.clone(),
            score: record.participant.score,
            answered: u32::try_from(record.answered_count()).unwrap_or(u32::MAX),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::models::{LiveQuizAnswer, LiveQuizParticipant};

    fn record(user_id: &str, join_order: i32, score: i32, answers: &[(i32, i16)]) -> ParticipantRecord {
        let now = primitive_now_utc();
        ParticipantRecord {
            participant: LiveQuizParticipant {
                quiz_id: "quiz".to_string(),
                user_id: user_id.to_string(),
                display_name: format!("Student {user_id}"),
                score,
                join_order,
                joined_at: now,
            },
            answers: answers
                .iter()
                .map(|&(question_index, chosen_option)| LiveQuizAnswer {
                    quiz_id: "quiz".to_string(),
                    user_id: user_id.to_string(),
                    question_index,
                    chosen_option,
                    points: 0,
                    answered_at: now,
                })
                .collect(),
        }
    }

    #[test]
    fn counts_current_question_only() {
        let participants = vec![
            record("a", 1, 0, &[(0, 1), (1, 2)]),
            record("b", 2, 0, &[(0, 1)]),
            record("c", 3, 0, &[(0, 3)]),
            record("d", 4, 0, &[]),
        ];

        let stats = live_stats(0, &participants);
        assert_eq!(stats.answer_counts, [0, 2, 0, 1]);
        assert_eq!(stats.total_answered, 3);
        assert_eq!(stats.total_participants, 4);
        assert_eq!(stats.question_number, 1);

        let stats = live_stats(1, &participants);
        assert_eq!(stats.answer_counts, [0, 0, 1, 0]);
        assert_eq!(stats.total_answered, 1);
    }

    #[test]
    fn duplicate_records_count_first_answer_once() {
        let participants = vec![record("a", 1, 0, &[(0, 2), (0, 0), (0, 1)])];
        let stats = live_stats(0, &participants);
        assert_eq!(stats.answer_counts, [0, 0, 1, 0]);
        assert_eq!(stats.total_answered, 1);
    }

    #[test]
    fn buckets_sum_to_total_answered() {
        let participants: Vec<ParticipantRecord> = (0..10)
            .map(|i| record(&format!("u{i}"), i + 1, 0, &[(0, (i % 4) as i16)]))
            .collect();
        let stats = live_stats(0, &participants);
        assert_eq!(stats.answer_counts.iter().sum::<u32>(), stats.total_answered);
        assert!(stats.total_answered <= stats.total_participants);
    }

    #[test]
    fn empty_room_has_zero_stats() {
        let stats = live_stats(0, &[]);
        assert_eq!(stats.answer_counts, [0; OPTION_COUNT]);
        assert_eq!(stats.total_participants, 0);
        assert_eq!(stats.total_answered, 0);
    }

    #[test]
    fn leaderboard_orders_by_score_then_join_order() {
        let participants = vec![
            record("a", 1, 100, &[(0, 1)]),
            record("b", 2, 200, &[(0, 1), (1, 0)]),
            record("c", 3, 100, &[(0, 1)]),
            record("d", 4, 0, &[]),
        ];

        let board = leaderboard(&participants);
        let order: Vec<(&str, u32)> =
            board.iter().map(|entry| (entry.user_id.as_str(), entry.rank)).collect();
        assert_eq!(order, vec![("b", 1), ("a", 2), ("c", 2), ("d", 4)]);
        assert_eq!(board[0].answered, 2);
        assert_eq!(board[3].answered, 0);
    }
}
