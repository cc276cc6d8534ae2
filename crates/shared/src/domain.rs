use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ModuleId);
id_newtype!(SubmoduleId);
id_newtype!(ItemId);
id_newtype!(ContentId);
id_newtype!(QuizId);
id_newtype!(QuestionId);
id_newtype!(OptionId);
id_newtype!(SessionId);
id_newtype!(StepId);

/// Level of the course tree an admin action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Module,
    Submodule,
    Item,
}

impl EntityKind {
    /// Path segment used by the admin endpoints (`/admin/{segment}/{id}/...`).
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Submodule => "submodule",
            Self::Item => "item",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Submodule => "submodule",
            Self::Item => "content item",
        }
    }

    pub fn title_label(self) -> &'static str {
        match self {
            Self::Module => "Module",
            Self::Submodule => "Submodule",
            Self::Item => "Content item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Quiz,
    Lab,
    Session,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Lab => "lab",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quiz" => Ok(Self::Quiz),
            "lab" => Ok(Self::Lab),
            "session" => Ok(Self::Session),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Completed,
    Locked,
    Available,
}
