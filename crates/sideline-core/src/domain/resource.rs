use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::ValidationError;

/// Leagues served by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nba,
    Nfl,
    Nhl,
}

impl Sport {
    pub const ALL: [Self; 3] = [Self::Nba, Self::Nfl, Self::Nhl];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nba => "nba",
            Self::Nfl => "nfl",
            Self::Nhl => "nhl",
        }
    }
}

impl Display for Sport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nba" => Ok(Self::Nba),
            "nfl" => Ok(Self::Nfl),
            "nhl" => Ok(Self::Nhl),
            other => Err(ValidationError::InvalidSport {
                value: other.to_owned(),
            }),
        }
    }
}

/// Logical data need, independent of which upstream ends up serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Games,
    Standings,
    Teams,
    Players,
    News,
    Odds,
}

impl ResourceKind {
    pub const ALL: [Self; 6] = [
        Self::Games,
        Self::Standings,
        Self::Teams,
        Self::Players,
        Self::News,
        Self::Odds,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Games => "games",
            Self::Standings => "standings",
            Self::Teams => "teams",
            Self::Players => "players",
            Self::News => "news",
            Self::Odds => "odds",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "games" => Ok(Self::Games),
            "standings" => Ok(Self::Standings),
            "teams" => Ok(Self::Teams),
            "players" => Ok(Self::Players),
            "news" => Ok(Self::News),
            "odds" => Ok(Self::Odds),
            other => Err(ValidationError::InvalidResource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameDate(Date);

impl GameDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: input.to_owned(),
        };

        let mut parts = input.trim().splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        // Integer parsing alone would let a sign through, e.g. "+024".
        if ![year, month, day]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month
            .parse::<u8>()
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(invalid)?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;

        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    pub const fn year(self) -> i32 {
        self.0.year()
    }

    /// `YYYYMMDD`, the form ESPN's scoreboard expects.
    pub fn compact(self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }

    pub fn into_inner(self) -> Date {
        self.0
    }
}

impl Display for GameDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl TryFrom<String> for GameDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameDate> for String {
    fn from(value: GameDate) -> Self {
        value.to_string()
    }
}

/// Logical resource a fallback chain is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub sport: Option<Sport>,
}

impl ResourceId {
    pub const fn new(kind: ResourceKind, sport: Option<Sport>) -> Self {
        Self { kind, sport }
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.sport {
            Some(sport) => write!(f, "{sport}_{}", self.kind),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

/// A concrete request for a logical resource plus its query parameters.
///
/// Deserializing enforces the same non-zero `limit` as [`ResourceKey::with_limit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "ResourceKeyFields")]
pub struct ResourceKey {
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<Sport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<GameDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ResourceKey {
    pub const fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            sport: None,
            date: None,
            limit: None,
        }
    }

    pub const fn for_sport(kind: ResourceKind, sport: Sport) -> Self {
        Self {
            kind,
            sport: Some(sport),
            date: None,
            limit: None,
        }
    }

    pub fn with_date(mut self, date: GameDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub const fn resource_id(&self) -> ResourceId {
        ResourceId::new(self.kind, self.sport)
    }

    /// Cache key, e.g. `nba_games` or `nba_games_2024-01-05_limit5`.
    pub fn cache_key(&self) -> String {
        let mut key = self.resource_id().to_string();
        if let Some(date) = self.date {
            key.push('_');
            key.push_str(&date.to_string());
        }
        if let Some(limit) = self.limit {
            key.push_str(&format!("_limit{limit}"));
        }
        key
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[derive(Deserialize)]
struct ResourceKeyFields {
    kind: ResourceKind,
    #[serde(default)]
    sport: Option<Sport>,
    #[serde(default)]
    date: Option<GameDate>,
    #[serde(default)]
    limit: Option<usize>,
}

impl TryFrom<ResourceKeyFields> for ResourceKey {
    type Error = ValidationError;

    fn try_from(fields: ResourceKeyFields) -> Result<Self, Self::Error> {
        let key = Self {
            kind: fields.kind,
            sport: fields.sport,
            date: fields.date,
            limit: None,
        };
        match fields.limit {
            Some(limit) => key.with_limit(limit),
            None => Ok(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sport_case_insensitively() {
        assert_eq!("NBA".parse::<Sport>(), Ok(Sport::Nba));
        assert_eq!(" nhl ".parse::<Sport>(), Ok(Sport::Nhl));
        assert!(matches!(
            "mlb".parse::<Sport>(),
            Err(ValidationError::InvalidSport { .. })
        ));
    }

    #[test]
    fn cache_key_includes_query_parameters() {
        let plain = ResourceKey::for_sport(ResourceKind::Games, Sport::Nba);
        assert_eq!(plain.cache_key(), "nba_games");

        let dated = plain
            .clone()
            .with_date(GameDate::parse("2024-01-05").expect("valid date"))
            .with_limit(5)
            .expect("non-zero limit");
        assert_eq!(dated.cache_key(), "nba_games_2024-01-05_limit5");

        assert_eq!(ResourceKey::new(ResourceKind::News).cache_key(), "news");
    }

    #[test]
    fn zero_limit_is_rejected() {
        let result = ResourceKey::new(ResourceKind::News).with_limit(0);
        assert_eq!(result, Err(ValidationError::ZeroLimit));
    }

    #[test]
    fn deserialized_keys_reject_a_zero_limit() {
        let zero = serde_json::from_str::<ResourceKey>(r#"{"kind":"news","limit":0}"#);
        assert!(zero.is_err());

        let five: ResourceKey =
            serde_json::from_str(r#"{"kind":"news","limit":5}"#).expect("non-zero limit");
        assert_eq!(five.limit, Some(5));

        let dated: ResourceKey =
            serde_json::from_str(r#"{"kind":"games","sport":"nba","date":"2024-01-05"}"#)
                .expect("no limit");
        assert_eq!(dated.cache_key(), "nba_games_2024-01-05");
    }

    #[test]
    fn game_date_round_trips_and_compacts() {
        let date = GameDate::parse("2024-02-29").expect("leap day is valid");
        assert_eq!(date.to_string(), "2024-02-29");
        assert_eq!(date.compact(), "20240229");
        assert_eq!(date.year(), 2024);

        assert!(GameDate::parse("2023-02-29").is_err());
        assert!(GameDate::parse("2024-1-5").is_err());
        assert!(GameDate::parse("yesterday").is_err());
    }

    #[test]
    fn game_date_rejects_signed_components() {
        assert!(GameDate::parse("2024-+1-05").is_err());
        assert!(GameDate::parse("+024-01-05").is_err());
        assert!(GameDate::parse("2024-01-+5").is_err());
        assert!(GameDate::parse("-024-01-05").is_err());
    }
}
