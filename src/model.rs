use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub favorite_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub genre: String,
    pub duration: String,
}

/// What clients get to see of a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub favorite_ids: Vec<String>,
}

impl Profile {
    pub fn new(id: u64, user: &User) -> Self {
        Profile {
            id: id.to_string(),
            username: user.username.clone(),
            name: user.name.clone(),
            favorite_ids: user.favorite_ids.clone(),
        }
    }
}

/// A movie together with its identifier, as sent over the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: String,
    #[serde(flatten)]
    pub movie: Movie,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteParams {
    pub movie_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteIds {
    pub favorite_ids: Vec<String>,
}
