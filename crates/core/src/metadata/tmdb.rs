//! TMDB (The Movie Database) API client.
//!
//! Implements [`MetadataProvider`] against the v3 REST API. The API key is
//! passed as a query parameter on every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::MetadataConfig;
use crate::media::MediaKind;

use super::types::{
    CastMember, Credits, CrewMember, DiscoverFilter, Episode, Genre, MediaSummary, MovieDetails,
    Paginated, Person, Season, SeasonSummary, TrendingWindow, TvDetails, Video,
};
use super::{MetadataError, MetadataProvider};

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(config: MetadataConfig) -> Result<Self, MetadataError> {
        if config.api_key.is_empty() {
            return Err(MetadataError::NotConfigured(
                "metadata API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
    }

    /// Map an error status to the distinguished error variants, then parse
    /// the body as `T`.
    async fn parse<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<T, MetadataError> {
        let status = response.status();
        if status == 401 {
            return Err(MetadataError::NotConfigured(
                "invalid metadata API key".to_string(),
            ));
        }
        if status == 404 {
            return Err(MetadataError::NotFound(what.to_string()));
        }
        if status == 429 {
            return Err(MetadataError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| MetadataError::Parse(format!("failed to parse {what} response: {e}")))
    }

    /// Movie/anime/tv distinction only exists in our own state; the
    /// provider has two catalogs.
    fn kind_path(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Movie => "movie",
            MediaKind::Tv | MediaKind::Anime => "tv",
        }
    }

    async fn listing(
        &self,
        path: &str,
        kind: MediaKind,
        extra: &[(&str, String)],
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        debug!(path, "TMDB listing request");
        let response = self.get(path).query(extra).send().await?;
        let page: WirePage<WireTitle> = Self::parse(response, path).await?;
        Ok(page.into_summaries(Some(kind)))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn trending(
        &self,
        window: TrendingWindow,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        let path = format!("/trending/all/{}", window.as_str());
        debug!(%page, window = window.as_str(), "TMDB trending");
        let response = self
            .get(&path)
            .query(&[("page", page.to_string())])
            .send()
            .await?;
        let wire: WirePage<WireTitle> = Self::parse(response, "trending").await?;
        Ok(wire.into_summaries(None))
    }

    async fn popular(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        let path = format!("/{}/popular", Self::kind_path(kind));
        self.listing(&path, kind, &[("page", page.to_string())])
            .await
    }

    async fn top_rated(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        let path = format!("/{}/top_rated", Self::kind_path(kind));
        self.listing(&path, kind, &[("page", page.to_string())])
            .await
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filter: DiscoverFilter,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        let path = format!("/discover/{}", Self::kind_path(kind));
        let mut params: Vec<(&str, String)> =
            vec![("page", filter.page.unwrap_or(1).to_string())];
        if let Some(genre) = filter.genre {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = filter.year {
            let key = match kind {
                MediaKind::Movie => "primary_release_year",
                MediaKind::Tv | MediaKind::Anime => "first_air_date_year",
            };
            params.push((key, year.to_string()));
        }
        if let Some(sort_by) = filter.sort_by {
            params.push(("sort_by", sort_by));
        }
        self.listing(&path, kind, &params).await
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError> {
        debug!(query, %page, "TMDB multi search");
        let response = self
            .get("/search/multi")
            .query(&[("query", query.to_string()), ("page", page.to_string())])
            .send()
            .await?;
        let wire: WirePage<WireTitle> = Self::parse(response, "search").await?;
        Ok(wire.into_summaries(None))
    }

    async fn movie(&self, id: u64) -> Result<MovieDetails, MetadataError> {
        debug!(id, "TMDB movie detail");
        let response = self.get(&format!("/movie/{id}")).send().await?;
        let wire: WireMovieDetails = Self::parse(response, &format!("movie {id}")).await?;
        Ok(wire.into())
    }

    async fn tv(&self, id: u64) -> Result<TvDetails, MetadataError> {
        debug!(id, "TMDB tv detail");
        let response = self.get(&format!("/tv/{id}")).send().await?;
        let wire: WireTvDetails = Self::parse(response, &format!("tv series {id}")).await?;
        Ok(wire.into())
    }

    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits, MetadataError> {
        let path = format!("/{}/{}/credits", Self::kind_path(kind), id);
        debug!(id, kind = kind.as_str(), "TMDB credits");
        let response = self.get(&path).send().await?;
        let wire: WireCredits = Self::parse(response, &format!("credits for {id}")).await?;
        Ok(wire.into())
    }

    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>, MetadataError> {
        let path = format!("/{}/{}/videos", Self::kind_path(kind), id);
        debug!(id, kind = kind.as_str(), "TMDB videos");
        let response = self.get(&path).send().await?;
        let wire: WireVideos = Self::parse(response, &format!("videos for {id}")).await?;
        Ok(wire.results.into_iter().map(Into::into).collect())
    }

    async fn tv_season(&self, id: u64, season: u32) -> Result<Season, MetadataError> {
        debug!(id, season, "TMDB season detail");
        let response = self.get(&format!("/tv/{id}/season/{season}")).send().await?;
        let wire: WireSeasonDetails =
            Self::parse(response, &format!("tv {id} season {season}")).await?;
        Ok(wire.into())
    }

    async fn person(&self, id: u64) -> Result<Person, MetadataError> {
        debug!(id, "TMDB person detail");
        let response = self.get(&format!("/person/{id}")).send().await?;
        let wire: WirePerson = Self::parse(response, &format!("person {id}")).await?;
        Ok(wire.into())
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, MetadataError> {
        let path = format!("/genre/{}/list", Self::kind_path(kind));
        debug!(kind = kind.as_str(), "TMDB genre list");
        let response = self.get(&path).send().await?;
        let wire: WireGenreList = Self::parse(response, "genre list").await?;
        Ok(wire.genres)
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct WirePage<T> {
    #[serde(default = "one")]
    page: u32,
    #[serde(default = "one")]
    total_pages: u32,
    #[serde(default)]
    total_results: u64,
    results: Vec<T>,
}

fn one() -> u32 {
    1
}

/// A movie or TV listing entry. Movie rows carry `title`/`release_date`,
/// TV rows `name`/`first_air_date`; multi-search and trending additionally
/// carry `media_type`.
#[derive(Debug, Deserialize)]
struct WireTitle {
    id: u64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
}

impl WirePage<WireTitle> {
    /// Convert a wire page into summaries. `fixed_kind` is used for
    /// single-catalog listings; mixed listings infer the kind per row and
    /// drop rows that are neither movie nor tv (e.g. person results from
    /// multi search).
    fn into_summaries(self, fixed_kind: Option<MediaKind>) -> Paginated<MediaSummary> {
        let results = self
            .results
            .into_iter()
            .filter_map(|r| r.into_summary(fixed_kind))
            .collect();
        Paginated {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results,
        }
    }
}

impl WireTitle {
    fn into_summary(self, fixed_kind: Option<MediaKind>) -> Option<MediaSummary> {
        let kind = match fixed_kind {
            Some(kind) => kind,
            None => match self.media_type.as_deref() {
                Some("movie") => MediaKind::Movie,
                Some("tv") => MediaKind::Tv,
                _ => return None,
            },
        };
        let title = self.title.or(self.name)?;
        Some(MediaSummary {
            id: self.id,
            kind,
            title,
            release_date: self.release_date.or(self.first_air_date),
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireGenre {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireGenreList {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct WireMovieDetails {
    id: u64,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    genres: Vec<WireGenre>,
    vote_average: Option<f32>,
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTvDetails {
    id: u64,
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    number_of_seasons: Option<u32>,
    number_of_episodes: Option<u32>,
    #[serde(default)]
    seasons: Vec<WireSeasonSummary>,
    #[serde(default)]
    genres: Vec<WireGenre>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireSeasonSummary {
    season_number: u32,
    name: Option<String>,
    episode_count: Option<u32>,
    air_date: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSeasonDetails {
    season_number: u32,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    episodes: Vec<WireEpisode>,
}

#[derive(Debug, Deserialize)]
struct WireEpisode {
    episode_number: u32,
    name: String,
    overview: Option<String>,
    runtime: Option<u32>,
    air_date: Option<String>,
    still_path: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireCredits {
    #[serde(default)]
    cast: Vec<WireCastMember>,
    #[serde(default)]
    crew: Vec<WireCrewMember>,
}

#[derive(Debug, Deserialize)]
struct WireCastMember {
    id: u64,
    name: String,
    character: Option<String>,
    profile_path: Option<String>,
    order: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireCrewMember {
    id: u64,
    name: String,
    job: Option<String>,
    department: Option<String>,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireVideos {
    #[serde(default)]
    results: Vec<WireVideo>,
}

#[derive(Debug, Deserialize)]
struct WireVideo {
    key: String,
    name: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    official: bool,
}

#[derive(Debug, Deserialize)]
struct WirePerson {
    id: u64,
    name: String,
    biography: Option<String>,
    birthday: Option<String>,
    place_of_birth: Option<String>,
    profile_path: Option<String>,
    known_for_department: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<WireGenre> for Genre {
    fn from(g: WireGenre) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

impl From<WireMovieDetails> for MovieDetails {
    fn from(d: WireMovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            original_title: d.original_title,
            release_date: d.release_date,
            runtime_minutes: d.runtime,
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            genres: d.genres.into_iter().map(Into::into).collect(),
            vote_average: d.vote_average,
            imdb_id: d.imdb_id,
        }
    }
}

impl From<WireTvDetails> for TvDetails {
    fn from(d: WireTvDetails) -> Self {
        Self {
            id: d.id,
            name: d.name,
            original_name: d.original_name,
            first_air_date: d.first_air_date,
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            number_of_seasons: d.number_of_seasons.unwrap_or(0),
            number_of_episodes: d.number_of_episodes.unwrap_or(0),
            seasons: d.seasons.into_iter().map(Into::into).collect(),
            genres: d.genres.into_iter().map(Into::into).collect(),
            vote_average: d.vote_average,
        }
    }
}

impl From<WireSeasonSummary> for SeasonSummary {
    fn from(s: WireSeasonSummary) -> Self {
        Self {
            season_number: s.season_number,
            name: s.name,
            episode_count: s.episode_count.unwrap_or(0),
            air_date: s.air_date,
            poster_path: s.poster_path,
        }
    }
}

impl From<WireSeasonDetails> for Season {
    fn from(d: WireSeasonDetails) -> Self {
        Self {
            season_number: d.season_number,
            name: d.name,
            overview: d.overview,
            poster_path: d.poster_path,
            episodes: d.episodes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireEpisode> for Episode {
    fn from(e: WireEpisode) -> Self {
        Self {
            episode_number: e.episode_number,
            name: e.name,
            overview: e.overview,
            runtime_minutes: e.runtime,
            air_date: e.air_date,
            still_path: e.still_path,
            vote_average: e.vote_average,
        }
    }
}

impl From<WireCredits> for Credits {
    fn from(c: WireCredits) -> Self {
        Self {
            cast: c.cast.into_iter().map(Into::into).collect(),
            crew: c.crew.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireCastMember> for CastMember {
    fn from(m: WireCastMember) -> Self {
        Self {
            id: m.id,
            name: m.name,
            character: m.character,
            profile_path: m.profile_path,
            order: m.order,
        }
    }
}

impl From<WireCrewMember> for CrewMember {
    fn from(m: WireCrewMember) -> Self {
        Self {
            id: m.id,
            name: m.name,
            job: m.job,
            department: m.department,
            profile_path: m.profile_path,
        }
    }
}

impl From<WireVideo> for Video {
    fn from(v: WireVideo) -> Self {
        Self {
            key: v.key,
            name: v.name,
            site: v.site,
            kind: v.kind,
            official: v.official,
        }
    }
}

impl From<WirePerson> for Person {
    fn from(p: WirePerson) -> Self {
        Self {
            id: p.id,
            name: p.name,
            biography: p.biography,
            birthday: p.birthday,
            place_of_birth: p.place_of_birth,
            profile_path: p.profile_path,
            known_for_department: p.known_for_department,
        }
    }
}
