use dotenvy::dotenv;
use lazy_static::lazy_static;
use secrecy::Secret;
use std::env as std_env;

lazy_static! {
    pub static ref MANDRILL_API_KEY: Secret<String> = Secret::new(set_api_key());
}

fn set_api_key() -> String {
    dotenv().ok();
    std_env::var(env::MANDRILL_API_KEY_ENV_VAR).unwrap_or_default()
}

pub mod env {
    pub const MANDRILL_API_KEY_ENV_VAR: &str = "MANDRILL_API_KEY";
}

pub mod prod {
    pub mod email_client {
        use std::time::Duration;
        pub const BASE_URL: &str = "https://mandrillapp.com/api/1.0";
        pub const TIMEOUT: Duration = Duration::from_secs(10);
    }
}

pub mod test {
    pub const API_KEY: &str = "test-api-key";

    pub mod email_client {
        use std::time::Duration;
        pub const TIMEOUT: Duration = Duration::from_millis(200);
    }
}
