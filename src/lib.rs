//! Session-authenticated backend for quiz takers and their certificates.
//!
//! Sessions are stateless signed tokens carried in the `token` cookie; user
//! documents and their certificate sets live behind [`repositories::user::UserStore`].

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod quiz;
    pub mod revocation;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod certificates;
    pub mod session;
}

pub mod handlers {
    pub mod quizzes;
    pub mod session;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod json;
    pub mod users;
}

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
