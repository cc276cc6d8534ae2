use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use shared::{
    domain::{OptionId, QuestionId, QuizId},
    protocol::{CheckAnswerRequest, ReviewQuestion, SubmitResultRequest},
};
use tracing::{error, info};

use crate::{
    api::CourseApi,
    error::{ClientError, Result},
    host::PageHost,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    InProgress,
    Submitted,
    Reviewing,
}

impl QuizPhase {
    fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Submitted => "submitted",
            Self::Reviewing => "under review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    /// Carries the option the server declared correct so it can be highlighted.
    Incorrect { correct_option_id: OptionId },
    /// The question was already answered; nothing was sent.
    AlreadyAnswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.answered, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizVerdict {
    Passed,
    Failed,
    /// The result could not be recorded; pass/fail is unknown.
    SaveError,
}

impl QuizVerdict {
    pub fn feedback(self) -> &'static str {
        match self {
            Self::Passed => "Congratulations, you passed!",
            Self::Failed => {
                "You did not pass this time. Please review your answers or try again in 1 minute."
            }
            Self::SaveError => "There was an error saving your score.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total: usize,
    pub verdict: QuizVerdict,
}

impl QuizResult {
    pub fn summary(&self) -> String {
        format!("You scored {} out of {}.", self.score, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    WrongSelection,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLine {
    pub option_id: OptionId,
    pub text: String,
    pub mark: OptionMark,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCard {
    pub question_id: QuestionId,
    pub text: String,
    pub lines: Vec<ReviewLine>,
}

/// One attempt at a quiz. Correctness is always decided by the server; the runner
/// only keeps what is needed for progress, scoring and the review screen.
pub struct QuizRunner {
    quiz_id: QuizId,
    questions: Vec<ReviewQuestion>,
    score: u32,
    answered: HashSet<QuestionId>,
    selections: HashMap<QuestionId, OptionId>,
    phase: QuizPhase,
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
}

impl QuizRunner {
    pub fn new(
        quiz_id: QuizId,
        questions: Vec<ReviewQuestion>,
        api: Arc<dyn CourseApi>,
        host: Arc<dyn PageHost>,
    ) -> Self {
        Self {
            quiz_id,
            questions,
            score: 0,
            answered: HashSet::new(),
            selections: HashMap::new(),
            phase: QuizPhase::InProgress,
            api,
            host,
        }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn questions(&self) -> &[ReviewQuestion] {
        &self.questions
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answered.contains(&question_id)
    }

    pub fn selection(&self, question_id: QuestionId) -> Option<OptionId> {
        self.selections.get(&question_id).copied()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answered.len(),
            total: self.questions.len(),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::InProgress && self.progress().is_complete()
    }

    pub async fn select_option(
        &mut self,
        question_id: QuestionId,
        option_id: OptionId,
    ) -> Result<AnswerOutcome> {
        self.require_phase(QuizPhase::InProgress)?;
        if self.answered.contains(&question_id) {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }
        if !self.questions.iter().any(|question| question.id == question_id) {
            return Err(ClientError::Validation(format!(
                "question {question_id} is not part of quiz {}",
                self.quiz_id
            )));
        }

        let request = CheckAnswerRequest {
            question_id,
            option_id,
        };
        let response = match self.api.check_answer(&request).await {
            Ok(response) => response,
            Err(err) => {
                error!("quiz: answer check failed quiz={} question={question_id}: {err}", self.quiz_id);
                self.host
                    .alert("Could not verify answer. Please refresh and try again.");
                return Err(err);
            }
        };

        self.selections.insert(question_id, option_id);
        self.answered.insert(question_id);

        let outcome = if response.correct {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect {
                correct_option_id: response.correct_option_id,
            }
        };
        info!(
            "quiz: answered quiz={} question={question_id} correct={} progress={}",
            self.quiz_id,
            response.correct,
            self.progress().label()
        );
        Ok(outcome)
    }

    /// Sends the final score. Only allowed once every question is answered; the
    /// pass/fail verdict is whatever the server says.
    pub async fn submit(&mut self) -> Result<QuizResult> {
        self.require_phase(QuizPhase::InProgress)?;
        if !self.progress().is_complete() {
            return Err(ClientError::Validation(format!(
                "answer every question before submitting ({})",
                self.progress().label()
            )));
        }
        self.phase = QuizPhase::Submitted;

        let request = SubmitResultRequest {
            quiz_id: self.quiz_id,
            score: self.score,
        };
        let verdict = match self.api.submit_result(&request).await {
            Ok(response) if response.passed => QuizVerdict::Passed,
            Ok(_) => QuizVerdict::Failed,
            Err(err) => {
                error!("quiz: submitting result failed quiz={}: {err}", self.quiz_id);
                QuizVerdict::SaveError
            }
        };
        info!(
            "quiz: submitted quiz={} score={} verdict={verdict:?}",
            self.quiz_id, self.score
        );

        Ok(QuizResult {
            score: self.score,
            total: self.questions.len(),
            verdict,
        })
    }

    /// Builds the review screen from local data only.
    pub fn review(&mut self) -> Result<Vec<ReviewCard>> {
        if self.phase == QuizPhase::InProgress {
            return Err(ClientError::InvalidPhase(self.phase.as_str()));
        }
        self.phase = QuizPhase::Reviewing;

        let cards = self
            .questions
            .iter()
            .map(|question| {
                let chosen = self.selections.get(&question.id).copied();
                let lines = question
                    .options
                    .iter()
                    .map(|option| {
                        let selected = chosen == Some(option.id);
                        let mark = if option.is_correct {
                            OptionMark::Correct
                        } else if selected {
                            OptionMark::WrongSelection
                        } else {
                            OptionMark::Plain
                        };
                        ReviewLine {
                            option_id: option.id,
                            text: option.text.clone(),
                            mark,
                            selected,
                        }
                    })
                    .collect();
                ReviewCard {
                    question_id: question.id,
                    text: question.text.clone(),
                    lines,
                }
            })
            .collect();
        Ok(cards)
    }

    fn require_phase(&self, expected: QuizPhase) -> Result<()> {
        if self.phase != expected {
            return Err(ClientError::InvalidPhase(self.phase.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/quiz_runner_tests.rs"]
mod tests;
