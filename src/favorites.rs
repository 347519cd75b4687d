use crate::error::{Error, Result};
use crate::models::{FavoritesList, Movie};
use crate::storage::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const FAVORITES_KEY: &str = "@FavoriteList";

/// Favorite movies persisted as one JSON array under [`FAVORITES_KEY`].
///
/// Every mutation is a read-modify-write of the whole list. Concurrent
/// mutations against the same store are last-write-wins.
#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<FavoritesList> {
        match self.store.get(FAVORITES_KEY).await? {
            None => Ok(FavoritesList::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(Error::CorruptState),
        }
    }

    pub async fn is_favorite(&self, movie_id: i32) -> Result<bool> {
        Ok(self.load().await?.contains(movie_id))
    }

    /// Adding an already favorited id leaves the list untouched.
    /// Movies with a blank title or out-of-range scores are rejected.
    pub async fn add(&self, movie: Movie) -> Result<()> {
        movie.validate().map_err(|reason| Error::InvalidMovie {
            movie_id: movie.id,
            reason,
        })?;
        let mut list = self.load().await?;
        let (id, title) = (movie.id, movie.title.clone());
        if !list.insert(movie) {
            debug!("Movie {} is already a favorite", id);
            return Ok(());
        }
        self.save(&list).await?;
        info!("Added '{}' ({}) to favorites", title, id);
        Ok(())
    }

    /// Removing an absent id succeeds without writing.
    pub async fn remove(&self, movie_id: i32) -> Result<()> {
        let mut list = self.load().await?;
        if !list.remove(movie_id) {
            debug!("Movie {} was not a favorite", movie_id);
            return Ok(());
        }
        self.save(&list).await?;
        info!("Removed movie {} from favorites", movie_id);
        Ok(())
    }

    /// Returns whether the movie is a favorite after the call.
    pub async fn toggle(&self, movie: Movie) -> Result<bool> {
        if self.is_favorite(movie.id).await? {
            self.remove(movie.id).await?;
            Ok(false)
        } else {
            self.add(movie).await?;
            Ok(true)
        }
    }

    async fn save(&self, list: &FavoritesList) -> Result<()> {
        let raw = encode(list)?;
        self.store.set(FAVORITES_KEY, &raw).await
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Error::Encode)
}
