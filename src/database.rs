use crate::model::*;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError, Transactional,
};
use std::convert::TryInto;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("undecodable record: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("bad key in tree {0}")]
    Key(&'static str),
}

impl From<TransactionError<DbError>> for DbError {
    fn from(err: TransactionError<DbError>) -> Self {
        match err {
            TransactionError::Storage(e) => DbError::Storage(e),
            TransactionError::Abort(e) => e,
        }
    }
}

fn abort<E: Into<DbError>>(err: E) -> ConflictableTransactionError<DbError> {
    ConflictableTransactionError::Abort(err.into())
}

fn serialize_id(id: u64) -> [u8; 8] {
    id.to_le_bytes()
}

fn deserialize_id<V: AsRef<[u8]>>(id: V, tree: &'static str) -> Result<u64, DbError> {
    id.as_ref()
        .try_into()
        .map(u64::from_le_bytes)
        .map_err(|_| DbError::Key(tree))
}

// Movie keys are big endian so that iteration follows insertion order.
fn movie_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

fn movie_id<V: AsRef<[u8]>>(key: V) -> Result<String, DbError> {
    key.as_ref()
        .try_into()
        .map(|bytes| u64::from_be_bytes(bytes).to_string())
        .map_err(|_| DbError::Key("movies"))
}

pub trait UserDb {
    type Error;
    fn add_user(&self, user: &User) -> Result<Option<u64>, Self::Error>;
    fn get_user(&self, id: u64) -> Result<Option<User>, Self::Error>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<(u64, User)>, Self::Error>;
    /// Returns the updated favorites, or `None` if the user does not exist.
    fn add_favorite(&self, id: u64, movie_id: &str) -> Result<Option<Vec<String>>, Self::Error>;
    fn remove_favorite(&self, id: u64, movie_id: &str)
        -> Result<Option<Vec<String>>, Self::Error>;
}

pub trait MovieDb {
    type Error;
    fn add_movie(&self, movie: &Movie) -> Result<String, Self::Error>;
    fn get_movie(&self, id: &str) -> Result<Option<Movie>, Self::Error>;
    fn movies(&self) -> Result<Vec<MovieRecord>, Self::Error>;
    /// Looks up `ids` in order, skipping the ones that no longer exist.
    fn movies_by_ids(&self, ids: &[String]) -> Result<Vec<MovieRecord>, Self::Error>;
}

const USERS: &[u8] = b"users";
const USERS_USERNAME: &[u8] = b"USERS_USERNAME";
const MOVIES: &[u8] = b"movies";

fn update_favorites<F>(db: &sled::Db, id: u64, update: F) -> Result<Option<Vec<String>>, DbError>
where
    F: Fn(&mut Vec<String>),
{
    let users = db.open_tree(USERS)?;
    let key = serialize_id(id).to_vec();
    let favorites = users.transaction(
        |users| -> ConflictableTransactionResult<Option<Vec<String>>, DbError> {
            let data = match users.get(&key)? {
                Some(data) => data,
                None => return Ok(None),
            };
            let mut user: User = bincode::deserialize(&data).map_err(abort)?;
            update(&mut user.favorite_ids);
            users.insert(key.clone(), bincode::serialize(&user).map_err(abort)?)?;
            Ok(Some(user.favorite_ids))
        },
    )?;
    Ok(favorites)
}

impl UserDb for sled::Db {
    type Error = DbError;

    fn add_user(&self, user: &User) -> Result<Option<u64>, DbError> {
        let users = self.open_tree(USERS)?;
        let users_username = self.open_tree(USERS_USERNAME)?;
        let id = self.generate_id()?;
        let data = bincode::serialize(user)?;
        if let Err(err) = (&users, &users_username).transaction(|(users, users_username)| {
            users.insert(serialize_id(id).to_vec(), data.clone())?;
            if users_username
                .insert(user.username.as_bytes(), serialize_id(id).to_vec())?
                .is_some()
            {
                sled::transaction::abort(())?;
            }
            Ok(())
        }) {
            match err {
                TransactionError::Storage(e) => return Err(e.into()),
                TransactionError::Abort(()) => return Ok(None),
            };
        }
        Ok(Some(id))
    }

    fn get_user(&self, id: u64) -> Result<Option<User>, DbError> {
        let users = self.open_tree(USERS)?;
        match users.get(serialize_id(id))? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<(u64, User)>, DbError> {
        let users_username = self.open_tree(USERS_USERNAME)?;
        let users = self.open_tree(USERS)?;
        if let Some(id) = users_username.get(username)? {
            let data = users.get(&id)?.ok_or(DbError::Key("USERS_USERNAME"))?;
            let user = bincode::deserialize(&data)?;
            Ok(Some((deserialize_id(id, "USERS_USERNAME")?, user)))
        } else {
            Ok(None)
        }
    }

    fn add_favorite(&self, id: u64, movie_id: &str) -> Result<Option<Vec<String>>, DbError> {
        update_favorites(self, id, |favorite_ids| {
            if !favorite_ids.iter().any(|favorite| favorite == movie_id) {
                favorite_ids.push(movie_id.to_owned());
            }
        })
    }

    fn remove_favorite(&self, id: u64, movie_id: &str) -> Result<Option<Vec<String>>, DbError> {
        update_favorites(self, id, |favorite_ids| {
            favorite_ids.retain(|favorite| favorite != movie_id)
        })
    }
}

impl MovieDb for sled::Db {
    type Error = DbError;

    fn add_movie(&self, movie: &Movie) -> Result<String, DbError> {
        let movies = self.open_tree(MOVIES)?;
        let id = self.generate_id()?;
        movies.insert(movie_key(id), bincode::serialize(movie)?)?;
        Ok(id.to_string())
    }

    fn get_movie(&self, id: &str) -> Result<Option<Movie>, DbError> {
        let id = match id.parse::<u64>() {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };
        let movies = self.open_tree(MOVIES)?;
        match movies.get(movie_key(id))? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    fn movies(&self) -> Result<Vec<MovieRecord>, DbError> {
        let movies = self.open_tree(MOVIES)?;
        movies
            .iter()
            .map(|entry| -> Result<MovieRecord, DbError> {
                let (key, data) = entry?;
                Ok(MovieRecord {
                    id: movie_id(key)?,
                    movie: bincode::deserialize(&data)?,
                })
            })
            .collect()
    }

    fn movies_by_ids(&self, ids: &[String]) -> Result<Vec<MovieRecord>, DbError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(movie) = self.get_movie(id)? {
                records.push(MovieRecord {
                    id: id.clone(),
                    movie,
                });
            }
        }
        Ok(records)
    }
}

/// Picks one movie of the catalogue, cycling through it as `rotation` grows.
pub fn featured_movie(db: &sled::Db, rotation: u64) -> Result<Option<MovieRecord>, DbError> {
    let mut movies = db.movies()?;
    if movies.is_empty() {
        return Ok(None);
    }
    let index = (rotation % movies.len() as u64) as usize;
    Ok(Some(movies.swap_remove(index)))
}

const SAMPLE_VIDEOS: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

fn sample_movie(title: &str, file: &str, genre: &str, duration: &str, description: &str) -> Movie {
    Movie {
        title: title.to_owned(),
        description: description.to_owned(),
        video_url: format!("{}/{}.mp4", SAMPLE_VIDEOS, file),
        thumbnail_url: format!("{}/images/{}.jpg", SAMPLE_VIDEOS, file),
        genre: genre.to_owned(),
        duration: duration.to_owned(),
    }
}

/// Fills an empty database with a small catalogue and an `admin` account.
/// Returns `false` if there already was a catalogue.
pub fn seed_demo(db: &sled::Db, admin_password_hash: String) -> Result<bool, DbError> {
    if !db.open_tree(MOVIES)?.is_empty() {
        return Ok(false);
    }
    let catalogue = [
        sample_movie(
            "Big Buck Bunny",
            "BigBuckBunny",
            "Comedy",
            "10 minutes",
            "Three rodents amuse themselves by harassing creatures of the forest.",
        ),
        sample_movie(
            "Sintel",
            "Sintel",
            "Adventure",
            "15 minutes",
            "A lonely young woman searches for the baby dragon she calls Scales.",
        ),
        sample_movie(
            "Elephant's Dream",
            "ElephantsDream",
            "Sci-Fi",
            "15 minutes",
            "Two men explore an endless mechanical world.",
        ),
        sample_movie(
            "Tears of Steel",
            "TearsOfSteel",
            "Sci-Fi",
            "12 minutes",
            "A group of warriors and scientists gather to save the world from robots.",
        ),
    ];
    for movie in catalogue.iter() {
        db.add_movie(movie)?;
    }
    db.add_user(&User {
        username: "admin".to_owned(),
        name: "Admin".to_owned(),
        password_hash: admin_password_hash,
        favorite_ids: Vec::new(),
    })?;
    Ok(true)
}
