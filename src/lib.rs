pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod seller;
    pub mod session;
}

pub mod repositories {
    pub mod seller;
}

pub mod services {
    pub mod auth;
    pub mod cookies;
}

pub mod handlers {
    pub mod health;
    pub mod sellers;
    pub mod sessions;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod rate_limit;
}

pub mod validation {
    pub mod auth;
}
