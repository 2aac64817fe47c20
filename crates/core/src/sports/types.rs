use serde::{Deserialize, Serialize};

/// Match listing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    Live,
    Popular,
    All,
}

impl MatchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchScope::Live => "live",
            MatchScope::Popular => "popular",
            MatchScope::All => "all",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsMatch {
    pub id: String,
    pub title: String,
    /// Sport id this match belongs to.
    pub category: String,
    /// Kickoff time, epoch milliseconds.
    pub date: i64,
    #[serde(default)]
    pub popular: bool,
    pub poster: Option<String>,
    #[serde(default)]
    pub teams: Option<MatchTeams>,
    #[serde(default)]
    pub sources: Vec<StreamSourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTeams {
    pub home: Option<Team>,
    pub away: Option<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub badge: Option<String>,
}

/// Pointer from a match to one stream source; resolved via
/// [`super::SportsProvider::streams`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSourceRef {
    pub source: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamLink {
    pub id: String,
    pub stream_no: u32,
    pub language: String,
    pub hd: bool,
    pub embed_url: String,
    pub source: String,
}
