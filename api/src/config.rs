use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 8080)]
    pub port: u16,

    /// Anything other than `development` runs in production mode.
    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(long = "db", env)]
    pub database_url: String,
    #[clap(long, env, default_value_t = 16)]
    pub database_pool_size: usize,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("dev"))]
    pub honeycomb_dataset: String,
}

impl Config {
    pub fn production(&self) -> bool {
        self.env != "development" && !cfg!(debug_assertions)
    }
}
