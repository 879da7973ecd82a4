pub mod pools;
pub mod title;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    settings::{QuestionKind, QuestionType},
    track::Track,
};

pub use pools::{Era, GenreBucket};
pub use title::clean_song_title;

pub const OPTION_COUNT: usize = 4;
const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;
const FALLBACK_GENRE_LABEL: &str = "Rock/Metal";

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub text: String,
    pub genre_label: String,
    pub correct_answer: String,
    /// Always `OPTION_COUNT` distinct entries, `correct_answer` exactly once
    pub options: Vec<String>,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// Builds questions for the configured question type
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    question_type: QuestionType,
}

impl QuestionGenerator {
    pub fn new(question_type: QuestionType) -> Self {
        Self { question_type }
    }

    /// Generate the question for one round. `mixed` is decided here, once per call.
    pub fn generate<R: Rng + ?Sized>(&self, track: &Track, rng: &mut R) -> Question {
        let kind = self.question_type.resolve(rng);
        build_question(track, kind, rng)
    }
}

pub fn prompt_for(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Song => "Which song is this?",
        QuestionKind::Artist => "Which artist/band performs this track?",
        QuestionKind::Guitarist => "Who is the guitarist for this track?",
    }
}

pub fn correct_answer_for(track: &Track, kind: QuestionKind) -> String {
    match kind {
        QuestionKind::Song => track.clean_title(),
        QuestionKind::Artist => track.artist.clone(),
        QuestionKind::Guitarist => track
            .guitarist
            .clone()
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| track.artist.clone()),
    }
}

pub fn build_question<R: Rng + ?Sized>(track: &Track, kind: QuestionKind, rng: &mut R) -> Question {
    let genre_label = if track.genre_name.trim().is_empty() {
        FALLBACK_GENRE_LABEL.to_string()
    } else {
        track.genre_name.clone()
    };
    let correct_answer = correct_answer_for(track, kind);
    let options = answer_options(&correct_answer, kind, &genre_label, rng);

    Question {
        kind,
        text: prompt_for(kind).to_string(),
        genre_label,
        correct_answer,
        options,
    }
}

/// The correct answer plus three distractors, uniformly shuffled
pub fn answer_options<R: Rng + ?Sized>(
    correct_answer: &str,
    kind: QuestionKind,
    genre_label: &str,
    rng: &mut R,
) -> Vec<String> {
    let chain = pools::fallback_chain(kind, genre_label);
    let mut options = vec![correct_answer.to_string()];
    options.extend(draw_distractors(correct_answer, &chain, rng));
    debug_assert_eq!(options.len(), OPTION_COUNT);
    options.shuffle(rng);
    options
}

/// Walk the pools in order, topping up with fresh values until there are enough
fn draw_distractors<R: Rng + ?Sized>(
    correct_answer: &str,
    chain: &[Vec<&'static str>],
    rng: &mut R,
) -> Vec<String> {
    let mut picked: Vec<&'static str> = Vec::with_capacity(DISTRACTOR_COUNT);

    for pool in chain {
        let needed = DISTRACTOR_COUNT - picked.len();
        if needed == 0 {
            break;
        }
        let candidates: Vec<&'static str> = pool
            .iter()
            .copied()
            .filter(|c| *c != correct_answer && !picked.contains(c))
            .collect();
        picked.extend(candidates.choose_multiple(rng, needed).copied());
    }

    picked.into_iter().map(str::to_string).collect()
}
