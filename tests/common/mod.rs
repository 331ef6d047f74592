#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use loop_epg::console::Operator;
use loop_epg::domain::CandidateMatch;
use loop_epg::error::EpgError;
use loop_epg::tmdb::{MetadataProvider, SearchKind};

/// Provider answering from a fixed table; unknown titles have no results.
#[derive(Default)]
pub struct MockProvider {
    results: HashMap<(String, &'static str), Vec<CandidateMatch>>,
    failing: Vec<String>,
    pub calls: RefCell<Vec<(String, SearchKind)>>,
}

impl MockProvider {
    pub fn with(mut self, name: &str, kind: SearchKind, candidates: Vec<CandidateMatch>) -> Self {
        self.results.insert((name.to_string(), kind.path()), candidates);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl MetadataProvider for MockProvider {
    fn search(&self, name: &str, kind: SearchKind) -> Result<Vec<CandidateMatch>, EpgError> {
        self.calls.borrow_mut().push((name.to_string(), kind));
        if self.failing.iter().any(|failing| failing == name) {
            return Err(EpgError::TmdbStatus {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self
            .results
            .get(&(name.to_string(), kind.path()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Interactive operator replaying canned answers; runs dry as closed input.
#[derive(Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn is_interactive(&self) -> bool {
        true
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front()
    }
}

pub fn candidate(title: &str, year: Option<&str>) -> CandidateMatch {
    CandidateMatch {
        title: title.to_string(),
        description: Some(format!("About {title}.")),
        artwork: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", title.to_lowercase())),
        year: year.map(str::to_string),
    }
}

pub fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
