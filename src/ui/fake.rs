use super::client::{Api, ApiError};
use crate::model::{FavoriteIds, Movie, MovieRecord, Profile};
use async_trait::async_trait;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Suspends once, so that a caller's future can be observed mid-flight.
// Wakes itself before returning `Pending`, otherwise the executor never polls
// it again.
#[derive(Default)]
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn profile(favorite_ids: &[&str]) -> Profile {
    Profile {
        id: "1".to_owned(),
        username: "admin".to_owned(),
        name: "Admin".to_owned(),
        favorite_ids: favorite_ids.iter().map(|id| id.to_string()).collect(),
    }
}

pub fn movie(id: &str) -> MovieRecord {
    MovieRecord {
        id: id.to_owned(),
        movie: Movie {
            title: format!("Movie {}", id),
            description: String::new(),
            video_url: format!("https://example/{}.mp4", id),
            thumbnail_url: format!("https://example/{}.jpg", id),
            genre: "Drama".to_owned(),
            duration: "90 minutes".to_owned(),
        },
    }
}

/// Records every request and answers from canned data.
#[derive(Default)]
pub struct FakeApi {
    pub calls: RefCell<Vec<String>>,
    pub user: Option<Profile>,
    pub movies: Vec<MovieRecord>,
    /// Returned by both favorite mutations.
    pub favorite_ids: Vec<String>,
    pub fail_mutations: bool,
}

impl FakeApi {
    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn mutation(&self) -> Result<FavoriteIds, ApiError> {
        if self.fail_mutations {
            return Err(ApiError::Status(500));
        }
        Ok(FavoriteIds {
            favorite_ids: self.favorite_ids.clone(),
        })
    }
}

#[async_trait(?Send)]
impl Api for FakeApi {
    async fn current_user(&self) -> Result<Profile, ApiError> {
        self.record("GET /api/current".to_owned());
        self.user.clone().ok_or(ApiError::Status(401))
    }

    async fn movie(&self, movie_id: &str) -> Result<MovieRecord, ApiError> {
        self.record(format!("GET /api/movies/{}", movie_id));
        self.movies
            .iter()
            .find(|movie| movie.id == movie_id)
            .cloned()
            .ok_or(ApiError::Status(404))
    }

    async fn favorites(&self) -> Result<Vec<MovieRecord>, ApiError> {
        self.record("GET /api/favorites".to_owned());
        let user = self.user.as_ref().ok_or(ApiError::Status(401))?;
        Ok(self
            .movies
            .iter()
            .filter(|movie| user.favorite_ids.contains(&movie.id))
            .cloned()
            .collect())
    }

    async fn add_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError> {
        self.record(format!("POST /api/favorite {{movieId:{}}}", movie_id));
        YieldNow::default().await;
        self.mutation()
    }

    async fn remove_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError> {
        self.record(format!("DELETE /api/favorite {{movieId:{}}}", movie_id));
        YieldNow::default().await;
        self.mutation()
    }
}
