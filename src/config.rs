use clap::Parser;
use std::env;

/// Q&A and tutor booking web service API
#[derive(Parser, Debug, PartialEq)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Which errors we want to log (info, warn or error)
    #[clap(short, long, default_value = "warn")]
    log_level: String,
    /// Which PORT the server is listening to
    #[clap(short, long, default_value = "3030")]
    port: u16,
    /// Database user
    #[clap(long, default_value = "user")]
    db_user: String,
    /// URL of the postgres database
    #[clap(long, default_value = "localhost")]
    db_host: String,
    /// PORT number for the database connection
    #[clap(long, default_value = "5432")]
    db_port: u16,
    /// Database name
    #[clap(long, default_value = "studenthub")]
    db_name: String,
}

#[derive(Debug, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
}

impl Config {
    /// CLI defaults, overridden by env vars (typically loaded via `.env`).
    pub fn new() -> Result<Config, handle_errors::Error> {
        let args = Args::parse();

        if env::var("PASETO_KEY").is_err() {
            panic!("PASETO_KEY not set");
        }

        let port = env::var("PORT")
            .ok()
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(args.port))
            .map_err(handle_errors::Error::ParseError)?;

        let db_user = env::var("POSTGRES_USER").unwrap_or_else(|_| args.db_user.to_owned());
        let db_password = env::var("POSTGRES_PASSWORD").expect("POSTGRES_PASSWORD not set");
        let db_host = env::var("POSTGRES_HOST").unwrap_or_else(|_| args.db_host.to_owned());
        let db_port = env::var("POSTGRES_PORT")
            .ok()
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(args.db_port))
            .map_err(handle_errors::Error::ParseError)?;
        let db_name = env::var("POSTGRES_DB").unwrap_or_else(|_| args.db_name.to_owned());

        Ok(Config {
            log_level: args.log_level,
            port,
            db_user,
            db_password,
            db_host,
            db_port,
            db_name,
        })
    }
}
