use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use shared::{
    domain::{QuizId, QuizStatus},
    protocol::QuizSummary,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::CourseApi;

pub const DEFAULT_COUNTDOWN_TICK: Duration = Duration::from_secs(1);

const EMPTY_NOTICE: &str = "There are currently no quizzes available.";
const LOAD_FAILED_NOTICE: &str = "Could not load quizzes. Please try again later.";

pub fn button_id(quiz_id: QuizId) -> String {
    format!("quiz-btn-{quiz_id}")
}

pub fn quiz_href(quiz_id: QuizId) -> String {
    format!("/quiz/{quiz_id}")
}

/// `Locked (m:ss)` for the time left before a quiz can be retaken.
pub fn locked_label(remaining: TimeDelta) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("Locked ({minutes}:{seconds:02})")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Completed,
    Locked { label: String },
    Start { href: String },
    Retry { href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCard {
    pub quiz_id: QuizId,
    pub button_id: String,
    pub title: String,
    pub blurb: String,
    pub action: CardAction,
}

impl QuizCard {
    fn from_summary(quiz: &QuizSummary) -> Self {
        let action = match quiz.status {
            QuizStatus::Completed => CardAction::Completed,
            QuizStatus::Locked => CardAction::Locked {
                label: "Locked".to_string(),
            },
            QuizStatus::Available => CardAction::Start {
                href: quiz_href(quiz.id),
            },
        };
        Self {
            quiz_id: quiz.id,
            button_id: button_id(quiz.id),
            title: quiz.title.clone(),
            blurb: format!(
                "This quiz contains {} questions. A score of {} is required to pass.",
                quiz.question_count, quiz.passing_score
            ),
            action,
        }
    }
}

/// The rendered card elements the countdown writes into.
pub trait CardSurface {
    fn is_mounted(&self, button_id: &str) -> bool;
    fn set_label(&mut self, button_id: &str, label: &str);
    fn replace_with_retry(&mut self, button_id: &str, href: &str);
}

/// In-memory rendering of the quiz list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizBoard {
    pub cards: Vec<QuizCard>,
    pub notice: Option<String>,
}

impl QuizBoard {
    pub fn render(quizzes: &[QuizSummary]) -> Self {
        if quizzes.is_empty() {
            return Self::notice(EMPTY_NOTICE);
        }
        Self {
            cards: quizzes.iter().map(QuizCard::from_summary).collect(),
            notice: None,
        }
    }

    pub fn notice(message: &str) -> Self {
        Self {
            cards: Vec::new(),
            notice: Some(message.to_string()),
        }
    }

    pub fn card(&self, button_id: &str) -> Option<&QuizCard> {
        self.cards.iter().find(|card| card.button_id == button_id)
    }

    pub fn remove(&mut self, quiz_id: QuizId) -> Option<QuizCard> {
        let index = self.cards.iter().position(|card| card.quiz_id == quiz_id)?;
        Some(self.cards.remove(index))
    }

    fn card_mut(&mut self, button_id: &str) -> Option<&mut QuizCard> {
        self.cards.iter_mut().find(|card| card.button_id == button_id)
    }
}

impl CardSurface for QuizBoard {
    fn is_mounted(&self, button_id: &str) -> bool {
        self.card(button_id).is_some()
    }

    fn set_label(&mut self, button_id: &str, label: &str) {
        if let Some(card) = self.card_mut(button_id) {
            card.action = CardAction::Locked {
                label: label.to_string(),
            };
        }
    }

    fn replace_with_retry(&mut self, button_id: &str, href: &str) {
        if let Some(card) = self.card_mut(button_id) {
            card.action = CardAction::Retry {
                href: href.to_string(),
            };
        }
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Countdown {
    quiz_id: QuizId,
    unlock_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub updated: Vec<QuizId>,
    pub unlocked: Vec<QuizId>,
    /// Countdowns dropped because their card left the page.
    pub pruned: Vec<QuizId>,
}

/// Loads the learner's quiz list and keeps locked cards counting down.
pub struct QuizListPoller {
    api: Arc<dyn CourseApi>,
    countdowns: HashMap<String, Countdown>,
    tick_every: Duration,
}

impl QuizListPoller {
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        Self {
            api,
            countdowns: HashMap::new(),
            tick_every: DEFAULT_COUNTDOWN_TICK,
        }
    }

    /// Sets the countdown period. A zero period is raised to one millisecond.
    pub fn with_tick(mut self, tick_every: Duration) -> Self {
        self.tick_every = tick_every.max(Duration::from_millis(1));
        self
    }

    pub fn tick_every(&self) -> Duration {
        self.tick_every
    }

    pub fn active_countdowns(&self) -> usize {
        self.countdowns.len()
    }

    pub fn has_countdown(&self, quiz_id: QuizId) -> bool {
        self.countdowns.contains_key(&button_id(quiz_id))
    }

    /// Fetches the list, renders it and registers a countdown for every locked quiz.
    pub async fn load(&mut self) -> QuizBoard {
        self.countdowns.clear();
        let quizzes = match self.api.list_quizzes().await {
            Ok(quizzes) => quizzes,
            Err(err) => {
                error!("quiz_list: failed to fetch quizzes: {err}");
                return QuizBoard::notice(LOAD_FAILED_NOTICE);
            }
        };

        for quiz in quizzes.iter().filter(|quiz| quiz.status == QuizStatus::Locked) {
            match quiz.unlock_time {
                Some(unlock_at) => {
                    self.countdowns.insert(
                        button_id(quiz.id),
                        Countdown {
                            quiz_id: quiz.id,
                            unlock_at,
                        },
                    );
                }
                None => warn!("quiz_list: locked quiz={} has no unlock time", quiz.id),
            }
        }
        info!(
            "quiz_list: loaded count={} locked={}",
            quizzes.len(),
            self.countdowns.len()
        );
        QuizBoard::render(&quizzes)
    }

    /// Advances every countdown to `now`. Elapsed ones turn into a retry action and
    /// are forgotten, as are countdowns whose card is no longer on the page.
    pub fn tick<S: CardSurface + ?Sized>(&mut self, now: DateTime<Utc>, surface: &mut S) -> TickReport {
        let mut report = TickReport::default();
        self.countdowns.retain(|button, countdown| {
            if !surface.is_mounted(button) {
                debug!("quiz_list: dropping countdown for unmounted {button}");
                report.pruned.push(countdown.quiz_id);
                return false;
            }

            let remaining = countdown.unlock_at - now;
            if remaining < TimeDelta::zero() {
                surface.replace_with_retry(button, &quiz_href(countdown.quiz_id));
                report.unlocked.push(countdown.quiz_id);
                return false;
            }

            surface.set_label(button, &locked_label(remaining));
            report.updated.push(countdown.quiz_id);
            true
        });

        for quiz_id in &report.unlocked {
            info!("quiz_list: quiz={quiz_id} unlocked");
        }
        report
    }

    /// Ticks immediately, then on a fixed interval until no countdown remains.
    pub async fn run<S: CardSurface + ?Sized>(&mut self, surface: &mut S, clock: &dyn Clock) {
        if self.countdowns.is_empty() {
            return;
        }
        let mut interval = tokio::time::interval(self.tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick(clock.now(), surface);
            if self.countdowns.is_empty() {
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/quiz_list_tests.rs"]
mod tests;
