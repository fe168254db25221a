// src/build/request.rs

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::errors::{GoalwatchError, Result};

/// What to ask the build session for on every trigger.
///
/// Goals and profiles keep their configured order; properties are sorted by
/// key so the rendered command line is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    goals: Vec<String>,
    profiles: Vec<String>,
    properties: BTreeMap<String, String>,
}

impl BuildRequest {
    /// Fails if `goals` is empty.
    pub fn new(
        goals: Vec<String>,
        profiles: Vec<String>,
        properties: BTreeMap<String, String>,
    ) -> Result<Self> {
        if goals.is_empty() {
            return Err(GoalwatchError::ConfigError(
                "a build request needs at least one goal".to_string(),
            ));
        }
        Ok(Self {
            goals,
            profiles,
            properties,
        })
    }

    /// Request with goals only.
    pub fn goals_only<I, S>(goals: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            goals.into_iter().map(Into::into).collect(),
            Vec::new(),
            BTreeMap::new(),
        )
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Arguments for a Maven-style command line: `-P<profile>` per profile,
    /// `-D<key>=<value>` per property, then the goals.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.profiles.len() + self.properties.len() + self.goals.len());
        args.extend(self.profiles.iter().map(|p| format!("-P{p}")));
        args.extend(self.properties.iter().map(|(k, v)| format!("-D{k}={v}")));
        args.extend(self.goals.iter().cloned());
        args
    }

    /// Human-readable equivalent of running this request with `program`.
    pub fn command_line(&self, program: &str) -> String {
        let mut line = program.to_string();
        for arg in self.to_args() {
            let _ = write!(line, " {arg}");
        }
        line
    }
}
