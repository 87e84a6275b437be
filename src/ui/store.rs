use super::client::{Api, ApiError};
use crate::model::{MovieRecord, Profile};
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// What changed in the [`Store`], in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    CurrentUser,
    Favorites,
    FavoritesInvalidated,
    Movie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(usize);

/// Owner of every piece of remote data the client holds.
///
/// The current user is versioned: each write bumps [`Store::version`], which
/// is what derived values key their memoization on. The favorites list is a
/// read-through cache that gets marked stale by mutations and refetched on
/// the next load.
#[derive(Default)]
pub struct Store {
    current_user: RefCell<Option<Profile>>,
    version: Cell<u64>,
    favorites: RefCell<Option<Vec<MovieRecord>>>,
    favorites_stale: Cell<bool>,
    movies: RefCell<HashMap<String, MovieRecord>>,
    subscribers: RefCell<Vec<(Subscription, Rc<dyn Fn(Change)>)>>,
    next_subscription: Cell<usize>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn subscribe<F: Fn(Change) + 'static>(&self, subscriber: F) -> Subscription {
        let subscription = Subscription(self.next_subscription.get());
        self.next_subscription.set(subscription.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((subscription, Rc::new(subscriber)));
        subscription
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers
            .borrow_mut()
            .retain(|(other, _)| *other != subscription);
    }

    fn notify(&self, change: Change) {
        // Subscribers may read the store, so don't hold the borrow.
        let subscribers: Vec<_> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect();
        for subscriber in subscribers {
            subscriber(change);
        }
    }

    pub fn version(&self) -> u64 {
        self.version.get()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.current_user.borrow().clone()
    }

    pub fn with_current_user<R, F: FnOnce(Option<&Profile>) -> R>(&self, f: F) -> R {
        f(self.current_user.borrow().as_ref())
    }

    pub fn set_current_user(&self, user: Profile) {
        *self.current_user.borrow_mut() = Some(user);
        self.version.set(self.version.get() + 1);
        self.notify(Change::CurrentUser);
    }

    /// Overwrites the cached user's favorites with `favorite_ids`, keeping
    /// every other field. Returns `false` if no user is cached.
    pub fn replace_favorite_ids(&self, favorite_ids: Vec<String>) -> bool {
        match self.current_user.borrow_mut().as_mut() {
            Some(user) => user.favorite_ids = favorite_ids,
            None => {
                debug!("No cached user to reconcile favorites into");
                return false;
            }
        }
        self.version.set(self.version.get() + 1);
        self.notify(Change::CurrentUser);
        true
    }

    pub fn favorites(&self) -> Option<Vec<MovieRecord>> {
        self.favorites.borrow().clone()
    }

    pub fn favorites_stale(&self) -> bool {
        self.favorites_stale.get() || self.favorites.borrow().is_none()
    }

    pub fn invalidate_favorites(&self) {
        self.favorites_stale.set(true);
        self.notify(Change::FavoritesInvalidated);
    }

    pub fn movie(&self, movie_id: &str) -> Option<MovieRecord> {
        self.movies.borrow().get(movie_id).cloned()
    }

    /// Fetches the current user, replacing whatever was cached.
    pub async fn refresh_current_user<A: Api + ?Sized>(&self, api: &A) -> Result<Profile, ApiError> {
        let user = api.current_user().await?;
        self.set_current_user(user.clone());
        Ok(user)
    }

    pub async fn load_current_user<A: Api + ?Sized>(&self, api: &A) -> Result<Profile, ApiError> {
        match self.current_user() {
            Some(user) => Ok(user),
            None => self.refresh_current_user(api).await,
        }
    }

    pub async fn load_favorites<A: Api + ?Sized>(
        &self,
        api: &A,
    ) -> Result<Vec<MovieRecord>, ApiError> {
        if !self.favorites_stale() {
            if let Some(favorites) = self.favorites() {
                return Ok(favorites);
            }
        }
        let favorites = api.favorites().await?;
        *self.favorites.borrow_mut() = Some(favorites.clone());
        self.favorites_stale.set(false);
        self.notify(Change::Favorites);
        Ok(favorites)
    }

    pub async fn load_movie<A: Api + ?Sized>(
        &self,
        api: &A,
        movie_id: &str,
    ) -> Result<MovieRecord, ApiError> {
        if let Some(movie) = self.movie(movie_id) {
            return Ok(movie);
        }
        let movie = api.movie(movie_id).await?;
        self.movies
            .borrow_mut()
            .insert(movie_id.to_owned(), movie.clone());
        self.notify(Change::Movie);
        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::fake::{movie, profile, FakeApi};

    #[actix_rt::test]
    async fn current_user_is_read_through() {
        let api = FakeApi {
            user: Some(profile(&["m1"])),
            ..FakeApi::default()
        };
        let store = Store::new();
        assert_eq!(store.version(), 0);
        assert_eq!(store.load_current_user(&api).await.unwrap(), profile(&["m1"]));
        assert_eq!(store.load_current_user(&api).await.unwrap(), profile(&["m1"]));
        assert_eq!(api.calls(), vec!["GET /api/current"]);
        assert_eq!(store.version(), 1);
    }

    #[actix_rt::test]
    async fn failed_load_leaves_cache_empty() {
        let api = FakeApi::default();
        let store = Store::new();
        assert_eq!(
            store.load_current_user(&api).await,
            Err(ApiError::Status(401))
        );
        assert_eq!(store.current_user(), None);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn replace_favorite_ids_keeps_profile_fields() {
        let store = Store::new();
        assert!(!store.replace_favorite_ids(vec!["m1".to_owned()]));
        store.set_current_user(profile(&["m1", "m2"]));
        assert!(store.replace_favorite_ids(vec!["m3".to_owned()]));
        let user = store.current_user().unwrap();
        assert_eq!(user.favorite_ids, vec!["m3".to_owned()]);
        assert_eq!(user.name, "Admin");
        assert_eq!(user.username, "admin");
        assert_eq!(store.version(), 2);
    }

    #[actix_rt::test]
    async fn favorites_are_refetched_after_invalidation() {
        let api = FakeApi {
            user: Some(profile(&["m1"])),
            movies: vec![movie("m1"), movie("m2")],
            ..FakeApi::default()
        };
        let store = Store::new();
        assert!(store.favorites_stale());
        assert_eq!(store.load_favorites(&api).await.unwrap(), vec![movie("m1")]);
        assert!(!store.favorites_stale());
        store.load_favorites(&api).await.unwrap();
        assert_eq!(api.calls().len(), 1);

        store.invalidate_favorites();
        assert!(store.favorites_stale());
        // The stale list stays readable until the refetch lands.
        assert_eq!(store.favorites(), Some(vec![movie("m1")]));
        store.load_favorites(&api).await.unwrap();
        assert_eq!(api.calls().len(), 2);
    }

    #[actix_rt::test]
    async fn movies_are_cached_by_id() {
        let api = FakeApi {
            movies: vec![movie("abc")],
            ..FakeApi::default()
        };
        let store = Store::new();
        assert_eq!(store.load_movie(&api, "abc").await.unwrap(), movie("abc"));
        assert_eq!(store.load_movie(&api, "abc").await.unwrap(), movie("abc"));
        assert_eq!(
            store.load_movie(&api, "nope").await,
            Err(ApiError::Status(404))
        );
        assert_eq!(
            api.calls(),
            vec!["GET /api/movies/abc", "GET /api/movies/nope"]
        );
    }

    #[test]
    fn subscribers_see_changes_in_order() {
        let store = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let seen = seen.clone();
            store.subscribe(move |change| seen.borrow_mut().push(change))
        };
        store.set_current_user(profile(&[]));
        store.invalidate_favorites();
        store.unsubscribe(subscription);
        store.invalidate_favorites();
        assert_eq!(
            *seen.borrow(),
            vec![Change::CurrentUser, Change::FavoritesInvalidated]
        );
    }
}
