/// Failures surfaced by the OAuth client, the Web API client, pagination and
/// view shaping. Nothing here is retried; callers propagate with `?` and the
/// web layer turns whatever arrives into a generic error page.
#[derive(Debug)]
pub enum Error {
    Network(String),
    Auth(String),
    RateLimit(u64),
    Api(String),
    TooManyPages(u32),
    MissingAlbumArt(String),
    Template(tera::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Auth(msg) => write!(f, "Auth error: {}", msg),
            Error::RateLimit(secs) => write!(f, "Rate limited, retry after {}s", secs),
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::TooManyPages(max) => {
                write!(f, "Paged endpoint did not terminate within {} pages", max)
            }
            Error::MissingAlbumArt(track) => {
                write!(f, "Track {:?} has no album image", track)
            }
            Error::Template(err) => write!(f, "Template error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            _ => None,
        }
    }
}

impl From<tera::Error> for Error {
    fn from(err: tera::Error) -> Self {
        Error::Template(err)
    }
}
