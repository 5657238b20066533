pub struct Config {
    pub db_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let db_path =
            std::env::var("BANDWATCH_DB_PATH").unwrap_or_else(|_| "./db/bandwatch.db".into());
        Self { db_path }
    }
}
