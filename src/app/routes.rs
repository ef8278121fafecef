// src/app/routes.rs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    MediaList,
    Favorites,
    Detail(String),
}

impl Route {
    /// `""` goes to login, unknown paths to the media list.
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_matches('/');
        match path {
            "" | "login" => Self::Login,
            "media" => Self::MediaList,
            "favorites" => Self::Favorites,
            _ => match path.strip_prefix("details/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::Detail(id.to_string()),
                _ => Self::MediaList,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::MediaList => "/media".into(),
            Self::Favorites => "/favorites".into(),
            Self::Detail(id) => format!("/details/{id}"),
        }
    }

    pub const fn requires_login(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// Redirect protected routes to login while logged out.
pub fn guard(route: Route, logged_in: bool) -> Route {
    if route.requires_login() && !logged_in {
        Route::Login
    } else {
        route
    }
}
