use super::client::{Api, ApiError};
use super::store::Store;
use crate::model::FavoriteIds;
use serde::Serialize;
use std::cell::Cell;
use thiserror::Error;

pub fn is_favorite(favorite_ids: &[String], movie_id: &str) -> bool {
    favorite_ids.iter().any(|id| id == movie_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteIcon {
    Add,
    Check,
}

impl FavoriteIcon {
    pub fn for_state(favorite: bool) -> Self {
        if favorite {
            FavoriteIcon::Check
        } else {
            FavoriteIcon::Add
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FavoriteError {
    /// The previous activation has not been answered yet.
    #[error("a favorite change is already in flight")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggled {
    pub favorite: bool,
    pub favorite_ids: Vec<String>,
}

struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn start(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(InFlight(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The add-to-my-list button of one movie.
pub struct FavoriteToggle {
    movie_id: String,
    memo: Cell<Option<(u64, bool)>>,
    in_flight: Cell<bool>,
}

impl FavoriteToggle {
    pub fn new(movie_id: &str) -> Self {
        FavoriteToggle {
            movie_id: movie_id.to_owned(),
            memo: Cell::new(None),
            in_flight: Cell::new(false),
        }
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub fn set_movie_id(&mut self, movie_id: &str) {
        if self.movie_id != movie_id {
            self.movie_id = movie_id.to_owned();
            self.memo.set(None);
        }
    }

    /// Memoized on the store version; an uncached user counts as "not a
    /// favorite".
    pub fn is_favorite(&self, store: &Store) -> bool {
        let version = store.version();
        if let Some((memo_version, favorite)) = self.memo.get() {
            if memo_version == version {
                return favorite;
            }
        }
        let favorite = store.with_current_user(|user| {
            user.map_or(false, |user| is_favorite(&user.favorite_ids, &self.movie_id))
        });
        self.memo.set(Some((version, favorite)));
        favorite
    }

    pub fn icon(&self, store: &Store) -> FavoriteIcon {
        FavoriteIcon::for_state(self.is_favorite(store))
    }

    /// The control is disabled while this is set.
    pub fn in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Sends the inverse of the current membership to the server and
    /// reconciles the store with the answer: the cached user's favorites are
    /// replaced first, then the favorites list is invalidated.
    ///
    /// On error nothing in the store is touched.
    pub async fn toggle<A: Api + ?Sized>(
        &self,
        api: &A,
        store: &Store,
    ) -> Result<Toggled, FavoriteError> {
        let _in_flight = InFlight::start(&self.in_flight).ok_or(FavoriteError::Busy)?;
        let FavoriteIds { favorite_ids } = if self.is_favorite(store) {
            api.remove_favorite(&self.movie_id).await?
        } else {
            api.add_favorite(&self.movie_id).await?
        };
        store.replace_favorite_ids(favorite_ids.clone());
        store.invalidate_favorites();
        Ok(Toggled {
            favorite: is_favorite(&favorite_ids, &self.movie_id),
            favorite_ids,
        })
    }
}
