//! Mock sports-stream provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::sports::{
    MatchScope, Sport, SportsError, SportsMatch, SportsProvider, StreamLink,
};

/// Serves configured listings and counts upstream calls so tests can
/// prove the caching layer actually short-circuits.
#[derive(Default)]
pub struct MockSports {
    sports: Mutex<Vec<Sport>>,
    matches: Mutex<Vec<SportsMatch>>,
    streams: Mutex<Vec<StreamLink>>,
    calls: AtomicUsize,
}

impl MockSports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sports(&self, sports: Vec<Sport>) {
        *self.sports.lock().unwrap() = sports;
    }

    pub fn set_matches(&self, matches: Vec<SportsMatch>) {
        *self.matches.lock().unwrap() = matches;
    }

    pub fn set_streams(&self, streams: Vec<StreamLink>) {
        *self.streams.lock().unwrap() = streams;
    }

    pub fn upstream_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SportsProvider for MockSports {
    async fn sports(&self) -> Result<Vec<Sport>, SportsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sports.lock().unwrap().clone())
    }

    async fn matches(
        &self,
        scope: MatchScope,
        sport: Option<&str>,
    ) -> Result<Vec<SportsMatch>, SportsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let matches = self.matches.lock().unwrap();
        let filtered = matches
            .iter()
            .filter(|m| match scope {
                MatchScope::Popular => m.popular,
                _ => true,
            })
            .filter(|m| sport.map(|s| m.category == s).unwrap_or(true))
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn streams(&self, _source: &str, id: &str) -> Result<Vec<StreamLink>, SportsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let streams = self.streams.lock().unwrap();
        if streams.is_empty() {
            return Err(SportsError::NotFound(format!("match {id}")));
        }
        Ok(streams.clone())
    }
}
