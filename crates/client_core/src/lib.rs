//! Page controllers for the course admin dashboard and the learner quiz/lab pages.
//!
//! Each controller owns its own state, talks to the server through [`CourseApi`]
//! and acts on the page through [`PageHost`]. Controllers never share state.

pub mod api;
pub mod crud;
pub mod error;
pub mod host;
pub mod quiz_list;
pub mod quiz_runner;
pub mod reorder;
pub mod validator;

pub use api::{CourseApi, HttpCourseApi};
pub use crud::{CrudController, CrudOutcome, EntityRef, SubmoduleParent};
pub use error::{ClientError, Result};
pub use host::PageHost;
pub use quiz_list::{
    CardAction, CardSurface, Clock, QuizBoard, QuizCard, QuizListPoller, SystemClock, TickReport,
};
pub use quiz_runner::{
    AnswerOutcome, OptionMark, Progress, QuizPhase, QuizResult, QuizRunner, QuizVerdict,
    ReviewCard, ReviewLine,
};
pub use reorder::{DragOutcome, ReorderBoard, ReorderList, ReorderScope, SyncMode};
pub use validator::{
    LabFeedback, LabStepChecker, RequirementStatus, SessionValidator, ValidationOutcome,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
