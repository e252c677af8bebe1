use super::domain::{Answers, QUESTION_COUNT};

/// Purity score: one point off for every "yes". Input length is guaranteed by [`Answers`].
pub fn score(answers: &Answers) -> u8 {
    let yes = answers.yes_count().min(QUESTION_COUNT);
    (QUESTION_COUNT - yes) as u8
}
