use super::Db;
use crate::database::{featured_movie, MovieDb, UserDb};
use crate::error::AppError;
use crate::model::*;
use crate::session;
use actix_identity::Identity;
use actix_web::{web, HttpResponse};
use log::debug;
use std::time::{SystemTime, UNIX_EPOCH};

fn authenticated(id: &Identity, db: &sled::Db) -> Result<(u64, User), AppError> {
    session::current_user(id, db)?.ok_or(AppError::Unauthorized)
}

pub async fn current(id: Identity, db: Db) -> Result<HttpResponse, AppError> {
    let (user_id, user) = authenticated(&id, &db)?;
    Ok(HttpResponse::Ok().json(Profile::new(user_id, &user)))
}

pub async fn movies(id: Identity, db: Db) -> Result<HttpResponse, AppError> {
    authenticated(&id, &db)?;
    Ok(HttpResponse::Ok().json(db.movies()?))
}

pub async fn movie(
    movie_id: web::Path<String>,
    id: Identity,
    db: Db,
) -> Result<HttpResponse, AppError> {
    authenticated(&id, &db)?;
    let movie_id = movie_id.into_inner();
    let movie = db
        .get_movie(&movie_id)?
        .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))?;
    Ok(HttpResponse::Ok().json(MovieRecord {
        id: movie_id,
        movie,
    }))
}

/// An arbitrary movie of the catalogue.
pub async fn random(id: Identity, db: Db) -> Result<HttpResponse, AppError> {
    authenticated(&id, &db)?;
    let rotation = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() as u64)
        .unwrap_or(0);
    let movie = featured_movie(&db, rotation)?
        .ok_or_else(|| AppError::NotFound("movies".to_owned()))?;
    Ok(HttpResponse::Ok().json(movie))
}

pub async fn favorites(id: Identity, db: Db) -> Result<HttpResponse, AppError> {
    let (_user_id, user) = authenticated(&id, &db)?;
    Ok(HttpResponse::Ok().json(db.movies_by_ids(&user.favorite_ids)?))
}

pub async fn add_favorite(
    params: web::Json<FavoriteParams>,
    id: Identity,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let (user_id, _user) = authenticated(&id, &db)?;
    if db.get_movie(&params.movie_id)?.is_none() {
        return Err(AppError::NotFound(format!("movie {}", params.movie_id)));
    }
    let favorite_ids = db
        .add_favorite(user_id, &params.movie_id)?
        .ok_or(AppError::Unauthorized)?;
    debug!("user {} added favorite {}", user_id, params.movie_id);
    Ok(HttpResponse::Ok().json(FavoriteIds { favorite_ids }))
}

/// Unknown ids are accepted so that favorites of deleted movies can be
/// cleaned up.
pub async fn remove_favorite(
    params: web::Json<FavoriteParams>,
    id: Identity,
    db: Db,
) -> Result<HttpResponse, AppError> {
    let (user_id, _user) = authenticated(&id, &db)?;
    let favorite_ids = db
        .remove_favorite(user_id, &params.movie_id)?
        .ok_or(AppError::Unauthorized)?;
    debug!("user {} removed favorite {}", user_id, params.movie_id);
    Ok(HttpResponse::Ok().json(FavoriteIds { favorite_ids }))
}
