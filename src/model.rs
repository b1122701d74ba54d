use std::fmt;

use serde::{Deserialize, Serialize};

/// Group assigned to members who never own a work item.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Kind of a collaborator reference.
///
/// Only [`Relation::Pair`] and [`Relation::Wait`] carry directional meaning.
/// Every other kind is counted generically and never feeds pair/wait math.
/// A reference logged without a relation is [`Relation::Unspecified`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    Pair,
    Wait,
    Review,
    Handoff,
    Other(String),
    #[default]
    Unspecified,
}

impl Relation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "pair" => Self::Pair,
            "wait" | "waiting-on" => Self::Wait,
            "review" => Self::Review,
            "handoff" => Self::Handoff,
            "" => Self::Unspecified,
            _ => Self::Other(trimmed.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pair => "pair",
            Self::Wait => "wait",
            Self::Review => "review",
            Self::Handoff => "handoff",
            Self::Other(name) => name.as_str(),
            Self::Unspecified => "",
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Self::Pair)
    }

    pub fn is_wait(&self) -> bool {
        matches!(self, Self::Wait)
    }
}

impl From<String> for Relation {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Relation> for String {
    fn from(value: Relation) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub name: String,
    #[serde(default)]
    pub relation: Relation,
}

impl Collaborator {
    pub fn new(name: impl Into<String>, relation: Relation) -> Self {
        Self {
            name: name.into(),
            relation,
        }
    }
}

/// One member's logged unit of work for a period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub owner: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

impl WorkItem {
    pub fn new(owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            group: Some(group.into()),
            module: None,
            collaborators: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, relation: Relation) -> Self {
        self.collaborators.push(Collaborator::new(name, relation));
        self
    }

    /// Collaborator references with a usable name.
    pub fn references(&self) -> impl Iterator<Item = &Collaborator> {
        self.collaborators
            .iter()
            .filter(|collaborator| !collaborator.name.trim().is_empty())
    }

    pub fn group(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
    }

    pub fn module(&self) -> Option<&str> {
        self.module
            .as_deref()
            .map(str::trim)
            .filter(|module| !module.is_empty())
    }
}
