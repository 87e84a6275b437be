use super::client::Api;
use super::nav::Route;
use super::store::Store;
use crate::model::Movie;
use log::debug;
use serde::Serialize;

/// What the watch page shows. Missing data stays `None` and renders blank.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchView {
    pub title: Option<String>,
    pub video_url: Option<String>,
}

impl WatchView {
    pub fn new(movie: Option<&Movie>) -> Self {
        match movie {
            Some(movie) => WatchView {
                title: Some(movie.title.clone()),
                video_url: Some(movie.video_url.clone()),
            },
            None => WatchView::default(),
        }
    }

    pub async fn load<A: Api + ?Sized>(api: &A, store: &Store, movie_id: &str) -> Self {
        match store.load_movie(api, movie_id).await {
            Ok(record) => WatchView::new(Some(&record.movie)),
            Err(err) => {
                debug!("movie {} unavailable: {}", movie_id, err);
                WatchView::default()
            }
        }
    }

    /// Target of the back arrow.
    pub fn back(&self) -> Route {
        Route::Home
    }
}
