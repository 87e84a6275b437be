use crate::model::{FavoriteIds, FavoriteParams, MovieRecord, Profile};
use actix_web::client::Client;
use async_trait::async_trait;
use thiserror::Error;

const JSON_LIMIT: usize = 1 << 20;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The remote resources the client reads and mutates.
#[async_trait(?Send)]
pub trait Api {
    async fn current_user(&self) -> Result<Profile, ApiError>;
    async fn movie(&self, movie_id: &str) -> Result<MovieRecord, ApiError>;
    async fn favorites(&self) -> Result<Vec<MovieRecord>, ApiError>;
    async fn add_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError>;
    async fn remove_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// `session_cookie` is sent verbatim as the `cookie` header.
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Self {
        let mut builder = Client::build();
        if let Some(cookie) = session_cookie {
            builder = builder.header("cookie", cookie);
        }
        HttpApi {
            client: builder.finish(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

macro_rules! expect_json {
    ($request:expr) => {{
        let mut response = $request
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        response
            .json()
            .limit(JSON_LIMIT)
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }};
}

#[async_trait(?Send)]
impl Api for HttpApi {
    async fn current_user(&self) -> Result<Profile, ApiError> {
        expect_json!(self.client.get(self.url("/api/current")).send())
    }

    async fn movie(&self, movie_id: &str) -> Result<MovieRecord, ApiError> {
        let url = self.url(&format!("/api/movies/{}", movie_id));
        expect_json!(self.client.get(url).send())
    }

    async fn favorites(&self) -> Result<Vec<MovieRecord>, ApiError> {
        expect_json!(self.client.get(self.url("/api/favorites")).send())
    }

    async fn add_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError> {
        let params = FavoriteParams {
            movie_id: movie_id.to_owned(),
        };
        expect_json!(self
            .client
            .post(self.url("/api/favorite"))
            .send_json(&params))
    }

    async fn remove_favorite(&self, movie_id: &str) -> Result<FavoriteIds, ApiError> {
        let params = FavoriteParams {
            movie_id: movie_id.to_owned(),
        };
        expect_json!(self
            .client
            .delete(self.url("/api/favorite"))
            .send_json(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{seed_demo, MovieDb, UserDb};
    use crate::handlers::{configure, Settings};
    use crate::ui::favorite::{FavoriteToggle, Toggled};
    use crate::ui::store::Store;
    use crate::ui::watch::WatchView;
    use actix_web::{test, App};

    #[actix_rt::test]
    async fn favorites_round_trip_through_the_server() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        seed_demo(&db, bcrypt::hash("password", 4).unwrap()).unwrap();
        let movie = db.movies().unwrap().remove(1);
        let srv = {
            let db = db.clone();
            test::start(move || {
                App::new()
                    .wrap(crate::identity_service(&[0; 32], false))
                    .data(
                        tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
                            .unwrap(),
                    )
                    .data(db.clone())
                    .data(Settings { bcrypt_cost: 4 })
                    .configure(configure)
            })
        };

        let response = srv
            .post("/auth/login")
            .send_form(&[("username", "admin"), ("password", "password")])
            .await
            .unwrap();
        let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_owned();

        let api = HttpApi::new(&srv.url("/"), Some(&cookie));
        let store = Store::new();
        assert_eq!(store.load_current_user(&api).await.unwrap().username, "admin");

        let toggle = FavoriteToggle::new(&movie.id);
        assert_eq!(
            toggle.toggle(&api, &store).await,
            Ok(Toggled {
                favorite: true,
                favorite_ids: vec![movie.id.clone()],
            })
        );
        assert_eq!(store.load_favorites(&api).await.unwrap(), vec![movie.clone()]);
        let (_id, admin) = db.get_user_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.favorite_ids, vec![movie.id.clone()]);

        let view = WatchView::load(&api, &store, &movie.id).await;
        assert_eq!(view.video_url, Some(movie.movie.video_url.clone()));

        assert_eq!(
            toggle.toggle(&api, &store).await,
            Ok(Toggled {
                favorite: false,
                favorite_ids: Vec::new(),
            })
        );
        assert!(store.current_user().unwrap().favorite_ids.is_empty());
        assert!(store.load_favorites(&api).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn missing_session_is_a_status_error() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let srv = test::start(move || {
            App::new()
                .wrap(crate::identity_service(&[0; 32], false))
                .data(db.clone())
                .configure(configure)
        });
        let api = HttpApi::new(&srv.url("/"), None);
        assert_eq!(api.current_user().await, Err(ApiError::Status(401)));
    }

    #[actix_rt::test]
    async fn urls_are_joined_on_the_base() {
        let api = HttpApi::new("http://localhost:8080/", None);
        assert_eq!(api.url("/api/current"), "http://localhost:8080/api/current");
    }

    #[actix_rt::test]
    async fn unreachable_server_is_a_request_error() {
        let api = HttpApi::new("http://127.0.0.1:1", Some("auth-cookie=x"));
        match api.current_user().await {
            Err(ApiError::Request(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
