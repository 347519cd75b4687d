use chrono::{Datelike, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub overview: String,
}

impl Movie {
    /// Absolute poster URL for an image size such as `w500` or `original`.
    pub fn poster_url(&self, size: &str) -> Option<String> {
        image_url(self.poster_path.as_deref(), size)
    }

    pub fn backdrop_url(&self, size: &str) -> Option<String> {
        image_url(self.backdrop_path.as_deref(), size)
    }

    /// Checks the invariants normalization guarantees for catalog records.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is blank".to_string());
        }
        if !(0.0..=10.0).contains(&self.vote_average) {
            return Err(format!("vote_average {} outside 0-10", self.vote_average));
        }
        if !(self.popularity.is_finite() && self.popularity >= 0.0) {
            return Err(format!("popularity {} is negative", self.popularity));
        }
        Ok(())
    }

    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{size}/{}", p.trim_start_matches('/')))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Favorited movies in insertion order, unique by id.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct FavoritesList {
    movies: Vec<Movie>,
}

impl FavoritesList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, movie_id: i32) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    /// Appends `movie` unless its id is already present. Returns whether it was added.
    pub fn insert(&mut self, movie: Movie) -> bool {
        if self.contains(movie.id) {
            return false;
        }
        self.movies.push(movie);
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, movie_id: i32) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.id != movie_id);
        self.movies.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn into_vec(self) -> Vec<Movie> {
        self.movies
    }
}

impl FromIterator<Movie> for FavoritesList {
    fn from_iter<I: IntoIterator<Item = Movie>>(iter: I) -> Self {
        let mut list = FavoritesList::new();
        for movie in iter {
            list.insert(movie);
        }
        list
    }
}

// Rebuilding through `insert` collapses duplicate ids left by older writers.
impl<'de> Deserialize<'de> for FavoritesList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let movies = Vec::<Movie>::deserialize(deserializer)?;
        for movie in &movies {
            movie
                .validate()
                .map_err(|reason| D::Error::custom(format!("movie {}: {reason}", movie.id)))?;
        }
        Ok(movies.into_iter().collect())
    }
}

/// Named catalog listings shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl Listing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listing::NowPlaying => "now_playing",
            Listing::Popular => "popular",
            Listing::TopRated => "top_rated",
            Listing::Upcoming => "upcoming",
        }
    }

    pub fn path(&self, language: &str) -> String {
        format!(
            "movie/{}?language={}&page=1",
            self.as_str(),
            urlencoding::encode(language)
        )
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Listing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "now_playing" => Ok(Listing::NowPlaying),
            "popular" => Ok(Listing::Popular),
            "top_rated" => Ok(Listing::TopRated),
            "upcoming" => Ok(Listing::Upcoming),
            other => Err(format!("unknown listing '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie(id: i32, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: None,
            vote_average: 6.5,
            vote_count: 10,
            release_date: "2019-05-30".to_string(),
            popularity: 1.0,
            overview: String::new(),
        }
    }

    #[test]
    fn insert_is_unique_by_id() {
        let mut list = FavoritesList::new();
        assert!(list.insert(movie(1, "A")));
        assert!(!list.insert(movie(1, "A again")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().map(|m| m.title.as_str()), Some("A"));
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut list: FavoritesList = vec![movie(1, "A"), movie(2, "B")].into_iter().collect();
        assert!(!list.remove(3));
        assert!(list.remove(1));
        assert!(!list.contains(1));
        assert!(list.contains(2));
    }

    #[test]
    fn deserializing_collapses_duplicate_ids() {
        let value = json!([
            { "id": 7, "title": "First" },
            { "id": 7, "title": "Second" },
            { "id": 8, "title": "Other" }
        ]);
        let list: FavoritesList = serde_json::from_value(value).expect("favorites deserialize");
        let titles: Vec<_> = list.iter().map(|m| m.title.clone()).collect();
        assert_eq!(titles, vec!["First".to_string(), "Other".to_string()]);
    }

    #[test]
    fn deserializing_rejects_invalid_records() {
        let blank = json!([{ "id": 2, "title": "", "vote_average": 5.0 }]);
        assert!(serde_json::from_value::<FavoritesList>(blank).is_err());

        let out_of_range = json!([{ "id": 2, "title": "Loud", "vote_average": 99 }]);
        assert!(serde_json::from_value::<FavoritesList>(out_of_range).is_err());

        let negative = json!([{ "id": 3, "title": "Quiet", "popularity": -1.0 }]);
        assert!(serde_json::from_value::<FavoritesList>(negative).is_err());
    }

    #[test]
    fn validate_checks_title_and_ranges() {
        assert!(movie(1, "A").validate().is_ok());
        assert!(movie(1, "   ").validate().is_err());
        let unrated = Movie {
            vote_average: 10.5,
            ..movie(1, "A")
        };
        assert!(unrated.validate().is_err());
        let negative = Movie {
            popularity: -5.0,
            ..movie(1, "A")
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn serializes_as_plain_array() {
        let list: FavoritesList = vec![movie(1, "A")].into_iter().collect();
        let value = serde_json::to_value(&list).expect("serialize");
        assert!(value.is_array());
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["poster_path"], "/p.jpg");
    }

    #[test]
    fn image_urls_and_year() {
        let m = movie(1, "A");
        assert_eq!(
            m.poster_url("w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert_eq!(m.backdrop_url("w780"), None);
        assert_eq!(m.release_year(), Some(2019));

        let undated = Movie {
            release_date: String::new(),
            ..m
        };
        assert_eq!(undated.release_year(), None);
    }

    #[test]
    fn listing_parses_and_builds_paths() {
        assert_eq!("top-rated".parse::<Listing>(), Ok(Listing::TopRated));
        assert_eq!("Now_Playing".parse::<Listing>(), Ok(Listing::NowPlaying));
        assert!("trending".parse::<Listing>().is_err());
        assert_eq!(
            Listing::Upcoming.path("en-US"),
            "movie/upcoming?language=en-US&page=1"
        );
    }
}
