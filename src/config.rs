use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

const COOKIE_KEY_LEN: usize = 32;

pub struct Config {
    pub bind: String,
    /// `None` runs on a temporary database.
    pub db_path: Option<PathBuf>,
    pub cookie_key: Vec<u8>,
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
    pub seed_demo: bool,
    pub templates: String,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        Ok(Config {
            bind: try_load("NEXTFLIX_BIND", "127.0.0.1:8080")?,
            db_path: env::var("NEXTFLIX_DB_PATH").ok().map(PathBuf::from),
            cookie_key: cookie_key(env::var("NEXTFLIX_COOKIE_KEY").ok()),
            secure_cookies: try_load("NEXTFLIX_SECURE_COOKIES", "false")?,
            bcrypt_cost: try_load("NEXTFLIX_BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?,
            seed_demo: try_load("NEXTFLIX_SEED", "true")?,
            templates: try_load(
                "NEXTFLIX_TEMPLATES",
                concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"),
            )?,
        })
    }

    pub fn open_db(&self) -> sled::Result<sled::Db> {
        match &self.db_path {
            Some(path) => sled::Config::new().path(path).open(),
            None => {
                warn!("NEXTFLIX_DB_PATH not set, data will be lost on shutdown");
                sled::Config::new().temporary(true).open()
            }
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_owned()
    });
    value
        .parse()
        .map_err(|e| format!("Invalid {} value {:?}: {}", key, value, e))
}

fn cookie_key(key: Option<String>) -> Vec<u8> {
    match key {
        Some(key) if key.len() >= COOKIE_KEY_LEN => key.into_bytes(),
        Some(_) => {
            warn!(
                "NEXTFLIX_COOKIE_KEY shorter than {} bytes, using development key",
                COOKIE_KEY_LEN
            );
            vec![0; COOKIE_KEY_LEN]
        }
        None => {
            warn!("NEXTFLIX_COOKIE_KEY not set, using development key");
            vec![0; COOKIE_KEY_LEN]
        }
    }
}
