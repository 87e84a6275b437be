pub mod api;
pub mod pages;

use actix_web::web;

type Tera = web::Data<tera::Tera>;
type Db = web::Data<sled::Db>;

#[derive(Clone, Copy)]
pub struct Settings {
    pub bcrypt_cost: u32,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/auth", web::get().to(pages::auth))
        .route("/auth/login", web::post().to(pages::login_post))
        .route("/auth/register", web::post().to(pages::register_post))
        .route("/auth/logout", web::get().to(pages::logout))
        .route("/watch/{movie_id}", web::get().to(pages::watch))
        .service(
            web::scope("/api")
                .route("/current", web::get().to(api::current))
                .route("/movies", web::get().to(api::movies))
                .route("/movies/{movie_id}", web::get().to(api::movie))
                .route("/random", web::get().to(api::random))
                .route("/favorites", web::get().to(api::favorites))
                .service(
                    web::resource("/favorite")
                        .route(web::post().to(api::add_favorite))
                        .route(web::delete().to(api::remove_favorite)),
                ),
        );
}
