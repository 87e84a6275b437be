use serde::Serialize;
use std::fmt;

pub const NAV_ITEMS: [&str; 6] = [
    "Home",
    "Series",
    "Films",
    "New & Popular",
    "My List",
    "Browse by languages",
];

pub const SIGN_OUT: &str = "/auth/logout";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Auth,
    Watch { movie_id: String },
}

impl Route {
    /// Where the play button of `movie_id` leads.
    pub fn watch(movie_id: &str) -> Self {
        Route::Watch {
            movie_id: movie_id.to_owned(),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(|c| c == '?' || c == '#').next().unwrap_or("");
        match path.trim_end_matches('/') {
            "" => Some(Route::Home),
            "/auth" => Some(Route::Auth),
            other => {
                let movie_id = other.strip_prefix("/watch/")?;
                if movie_id.is_empty() || movie_id.contains('/') {
                    None
                } else {
                    Some(Route::watch(movie_id))
                }
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Auth => write!(f, "/auth"),
            Route::Watch { movie_id } => write!(f, "/watch/{}", movie_id),
        }
    }
}

/// Open/closed state of the two overlay menus of the navigation bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavBar {
    pub mobile_menu_open: bool,
    pub account_menu_open: bool,
}

impl NavBar {
    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn toggle_account_menu(&mut self) {
        self.account_menu_open = !self.account_menu_open;
    }
}
