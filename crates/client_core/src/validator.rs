use std::{sync::Arc, time::Duration};

use shared::{
    domain::{SessionId, StepId},
    protocol::{CheckStepRequest, ValidateSessionRequest},
};
use tracing::{error, info, warn};

use crate::{
    api::CourseApi,
    error::{ClientError, Result},
    host::PageHost,
};

/// Pause between the completion celebration and leaving the page.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementStatus {
    Pending,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Incomplete { passed: usize, total: usize },
    Complete { redirect: String },
}

/// Checks a practical session's code against its requirement checklist.
///
/// The server answers with one boolean per requirement in checklist order; the
/// pairing is positional only.
pub struct SessionValidator {
    session_id: SessionId,
    checklist: Vec<RequirementStatus>,
    redirect_delay: Duration,
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
}

impl SessionValidator {
    pub fn new(
        session_id: SessionId,
        requirement_count: usize,
        api: Arc<dyn CourseApi>,
        host: Arc<dyn PageHost>,
    ) -> Self {
        Self {
            session_id,
            checklist: vec![RequirementStatus::Pending; requirement_count],
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            api,
            host,
        }
    }

    pub fn with_redirect_delay(mut self, redirect_delay: Duration) -> Self {
        self.redirect_delay = redirect_delay;
        self
    }

    pub fn checklist(&self) -> &[RequirementStatus] {
        &self.checklist
    }

    pub fn completion_url(&self) -> String {
        format!("/session/{}/complete", self.session_id)
    }

    pub async fn check(&mut self, user_code: &str) -> Result<ValidationOutcome> {
        let request = ValidateSessionRequest {
            session_id: self.session_id,
            user_code: user_code.to_string(),
        };
        let response = match self.api.validate_session(&request).await {
            Ok(response) => response,
            Err(err) => {
                error!("session: validation failed session={}: {err}", self.session_id);
                self.host
                    .alert("An error occurred while checking your code. Please try again.");
                return Err(err);
            }
        };

        // Each call replaces the previous result set wholesale.
        let mut statuses = response.results.iter().copied();
        for status in self.checklist.iter_mut() {
            *status = match statuses.next() {
                Some(true) => RequirementStatus::Passed,
                Some(false) => RequirementStatus::Failed,
                None => RequirementStatus::Pending,
            };
        }
        if response.results.len() != self.checklist.len() {
            warn!(
                "session: result count mismatch session={} results={} requirements={}",
                self.session_id,
                response.results.len(),
                self.checklist.len()
            );
        }

        // Fewer results than requirements leaves some unchecked.
        let all_passed = response.results.len() >= self.checklist.len()
            && response.results.iter().all(|passed| *passed);
        if !all_passed {
            let passed = self
                .checklist
                .iter()
                .filter(|status| **status == RequirementStatus::Passed)
                .count();
            info!(
                "session: checked session={} passed={passed}/{}",
                self.session_id,
                self.checklist.len()
            );
            return Ok(ValidationOutcome::Incomplete {
                passed,
                total: self.checklist.len(),
            });
        }

        let redirect = self.completion_url();
        info!("session: all requirements met session={}", self.session_id);
        self.host.celebrate();
        tokio::time::sleep(self.redirect_delay).await;
        self.host.navigate(&redirect);
        Ok(ValidationOutcome::Complete { redirect })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabFeedback {
    Advanced { next_url: String },
    Incorrect { message: String },
}

/// Checks one typed step of a guided lab.
pub struct LabStepChecker {
    step_id: StepId,
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
}

impl LabStepChecker {
    pub fn new(step_id: StepId, api: Arc<dyn CourseApi>, host: Arc<dyn PageHost>) -> Self {
        Self { step_id, api, host }
    }

    pub async fn check(&mut self, user_input: &str) -> Result<LabFeedback> {
        let request = CheckStepRequest {
            step_id: self.step_id,
            user_input: user_input.to_string(),
        };
        let result = self.api.check_step(&request).await.and_then(|response| {
            match (response.correct, response.next_url) {
                (true, Some(next_url)) => Ok(LabFeedback::Advanced { next_url }),
                (true, None) => Err(ClientError::Validation(
                    "step accepted without a next_url".to_string(),
                )),
                (false, _) => Ok(LabFeedback::Incorrect {
                    message: response
                        .message
                        .unwrap_or_else(|| "Incorrect. Please try again.".to_string()),
                }),
            }
        });

        match &result {
            Ok(LabFeedback::Advanced { next_url }) => {
                info!("lab: step={} passed, moving to {next_url}", self.step_id);
                self.host.navigate(next_url);
            }
            Ok(LabFeedback::Incorrect { message }) => {
                info!("lab: step={} incorrect: {message}", self.step_id);
            }
            Err(err) => {
                error!("lab: checking step={} failed: {err}", self.step_id);
                self.host.alert("An error occurred. Please try again.");
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
