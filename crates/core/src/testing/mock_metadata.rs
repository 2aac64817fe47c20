//! Mock metadata provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::media::MediaKind;
use crate::metadata::{
    Credits, DiscoverFilter, Genre, MediaSummary, MetadataError, MetadataProvider, MovieDetails,
    Paginated, Person, Season, TrendingWindow, TvDetails, Video,
};

/// Serves configured summaries for every listing call and configured
/// details by id. Unknown ids map to `NotFound`, matching the real
/// client's 404 handling.
#[derive(Default)]
pub struct MockMetadata {
    summaries: Mutex<Vec<MediaSummary>>,
    movies: Mutex<HashMap<u64, MovieDetails>>,
    series: Mutex<HashMap<u64, TvDetails>>,
    seasons: Mutex<HashMap<(u64, u32), Season>>,
    people: Mutex<HashMap<u64, Person>>,
    genres: Mutex<Vec<Genre>>,
    search_queries: Mutex<Vec<String>>,
    fail_with_status: Mutex<Option<u16>>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_summaries(&self, summaries: Vec<MediaSummary>) {
        *self.summaries.lock().unwrap() = summaries;
    }

    pub fn add_movie(&self, details: MovieDetails) {
        self.movies.lock().unwrap().insert(details.id, details);
    }

    pub fn add_tv(&self, details: TvDetails) {
        self.series.lock().unwrap().insert(details.id, details);
    }

    pub fn add_season(&self, id: u64, season: Season) {
        self.seasons
            .lock()
            .unwrap()
            .insert((id, season.season_number), season);
    }

    pub fn add_person(&self, person: Person) {
        self.people.lock().unwrap().insert(person.id, person);
    }

    pub fn set_genres(&self, genres: Vec<Genre>) {
        *self.genres.lock().unwrap() = genres;
    }

    /// Make every call fail with an upstream status until cleared.
    pub fn fail_with_status(&self, status: Option<u16>) {
        *self.fail_with_status.lock().unwrap() = status;
    }

    pub fn recorded_searches(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), MetadataError> {
        match *self.fail_with_status.lock().unwrap() {
            Some(429) => Err(MetadataError::RateLimited),
            Some(status) => Err(MetadataError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn page(&self, page: u32) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.check_failure()?;
        let results = self.summaries.lock().unwrap().clone();
        Ok(Paginated {
            page,
            total_pages: 1,
            total_results: results.len() as u64,
            results,
        })
    }
}

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn trending(
        &self,
        _window: TrendingWindow,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.page(page)
    }

    async fn popular(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.check_failure()?;
        let results = self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.kind == kind || kind == MediaKind::Anime)
            .cloned()
            .collect::<Vec<_>>();
        Ok(Paginated {
            page,
            total_pages: 1,
            total_results: results.len() as u64,
            results,
        })
    }

    async fn top_rated(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.popular(kind, page).await
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filter: DiscoverFilter,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.popular(kind, filter.page.unwrap_or(1)).await
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        self.search_queries.lock().unwrap().push(query.to_string());
        self.page(page)
    }

    async fn movie(&self, id: u64) -> Result<MovieDetails, MetadataError> {
        self.check_failure()?;
        self.movies
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("movie {id}")))
    }

    async fn tv(&self, id: u64) -> Result<TvDetails, MetadataError> {
        self.check_failure()?;
        self.series
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("tv {id}")))
    }

    async fn credits(&self, _kind: MediaKind, _id: u64) -> Result<Credits, MetadataError> {
        self.check_failure()?;
        Ok(Credits {
            cast: Vec::new(),
            crew: Vec::new(),
        })
    }

    async fn videos(&self, _kind: MediaKind, _id: u64) -> Result<Vec<Video>, MetadataError> {
        self.check_failure()?;
        Ok(Vec::new())
    }

    async fn tv_season(&self, id: u64, season: u32) -> Result<Season, MetadataError> {
        self.check_failure()?;
        self.seasons
            .lock()
            .unwrap()
            .get(&(id, season))
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("tv {id} season {season}")))
    }

    async fn person(&self, id: u64) -> Result<Person, MetadataError> {
        self.check_failure()?;
        self.people
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("person {id}")))
    }

    async fn genres(&self, _kind: MediaKind) -> Result<Vec<Genre>, MetadataError> {
        self.check_failure()?;
        Ok(self.genres.lock().unwrap().clone())
    }
}
