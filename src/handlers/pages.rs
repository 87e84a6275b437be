use super::{Db, Settings, Tera};
use crate::database::{featured_movie, MovieDb, UserDb};
use crate::error::AppError;
use crate::model::*;
use crate::session::{self, Access};
use crate::ui::favorite::{is_favorite, FavoriteIcon};
use crate::ui::nav::{NavBar, Route, NAV_ITEMS, SIGN_OUT};
use crate::ui::watch::WatchView;
use actix_identity::Identity;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

fn render(tera: &tera::Tera, template: &str, ctx: &tera::Context) -> Result<HttpResponse, AppError> {
    let body = tera.render(template, ctx)?;
    Ok(HttpResponse::Ok().content_type("text/html").body(body))
}

/// A movie as shown on the home page, with its play and favorite controls.
#[derive(Serialize)]
struct MovieCard<'a> {
    #[serde(flatten)]
    record: &'a MovieRecord,
    play: String,
    favorite: bool,
    icon: FavoriteIcon,
}

impl<'a> MovieCard<'a> {
    fn new(record: &'a MovieRecord, favorite_ids: &[String]) -> Self {
        let favorite = is_favorite(favorite_ids, &record.id);
        MovieCard {
            record,
            play: Route::watch(&record.id).to_string(),
            favorite,
            icon: FavoriteIcon::for_state(favorite),
        }
    }
}

fn days_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() / SECONDS_PER_DAY)
        .unwrap_or(0)
}

pub async fn index(id: Identity, tera: Tera, db: Db) -> Result<HttpResponse, AppError> {
    let (user_id, user) = match session::guard(session::current_user(&id, &db)?) {
        Access::Allow(session) => session,
        Access::Redirect(location) => return Ok(session::redirect(location)),
    };
    let movies = db.movies()?;
    let favorites = db.movies_by_ids(&user.favorite_ids)?;
    let billboard = featured_movie(&db, days_since_epoch())?;

    let mut ctx = tera::Context::new();
    ctx.insert("user", &Profile::new(user_id, &user));
    ctx.insert("nav", &NavBar::default());
    ctx.insert("nav_items", &NAV_ITEMS);
    ctx.insert("sign_out", SIGN_OUT);
    ctx.insert(
        "billboard",
        &billboard
            .as_ref()
            .map(|record| MovieCard::new(record, &user.favorite_ids)),
    );
    ctx.insert(
        "movies",
        &movies
            .iter()
            .map(|record| MovieCard::new(record, &user.favorite_ids))
            .collect::<Vec<_>>(),
    );
    ctx.insert(
        "favorites",
        &favorites
            .iter()
            .map(|record| MovieCard::new(record, &user.favorite_ids))
            .collect::<Vec<_>>(),
    );
    render(&tera, "index.html", &ctx)
}

pub async fn auth(req: HttpRequest, id: Identity, tera: Tera, db: Db) -> Result<HttpResponse, AppError> {
    if session::current_user(&id, &db)?.is_some() {
        return Ok(session::redirect(&Route::Home.to_string()));
    }
    let mut ctx = tera::Context::new();
    let notice = match req.query_string() {
        "wrong_password" => Some("Wrong username or password."),
        "taken" => Some("That username is already taken."),
        "invalid" => Some("Username and password must not be empty."),
        "logout" => Some("You have been signed out."),
        _ => None,
    };
    ctx.insert("notice", &notice);
    render(&tera, "auth.html", &ctx)
}

#[derive(Serialize, Deserialize)]
pub struct LoginParams {
    username: String,
    password: String,
}

pub async fn login_post(
    params: web::Form<LoginParams>,
    id: Identity,
    db: Db,
) -> Result<HttpResponse, AppError> {
    if let Some((_user_id, user)) = db.get_user_by_username(&params.username)? {
        if bcrypt::verify(&params.password, &user.password_hash)? {
            id.remember(user.username);
            return Ok(session::redirect("/"));
        }
    }
    Ok(session::redirect("/auth?wrong_password"))
}

#[derive(Serialize, Deserialize)]
pub struct RegisterParams {
    username: String,
    name: String,
    password: String,
}

pub async fn register_post(
    params: web::Form<RegisterParams>,
    id: Identity,
    db: Db,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let username = params.username.trim();
    if username.is_empty() || params.password.is_empty() {
        return Ok(session::redirect("/auth?invalid"));
    }
    let name = match params.name.trim() {
        "" => username,
        name => name,
    };
    let user = User {
        username: username.to_owned(),
        name: name.to_owned(),
        password_hash: bcrypt::hash(&params.password, settings.bcrypt_cost)?,
        favorite_ids: Vec::new(),
    };
    match db.add_user(&user)? {
        Some(user_id) => {
            info!("Registered user {} ({})", user.username, user_id);
            id.remember(user.username);
            Ok(session::redirect("/"))
        }
        None => Ok(session::redirect("/auth?taken")),
    }
}

pub async fn logout(id: Identity) -> HttpResponse {
    id.forget();
    session::redirect("/auth?logout")
}

/// Not gated; without a session the movie is simply not shown.
pub async fn watch(req: HttpRequest, id: Identity, tera: Tera, db: Db) -> Result<HttpResponse, AppError> {
    let movie_id = match Route::parse(req.path()) {
        Some(Route::Watch { movie_id }) => movie_id,
        _ => return Err(AppError::NotFound(req.path().to_owned())),
    };
    let movie = match session::current_user(&id, &db)? {
        Some(_) => db.get_movie(&movie_id)?,
        None => None,
    };
    let view = WatchView::new(movie.as_ref());
    let mut ctx = tera::Context::new();
    ctx.insert("back", &view.back().to_string());
    ctx.insert("watch", &view);
    render(&tera, "watch.html", &ctx)
}
