use std::{
    env,
    net::{IpAddr, SocketAddr},
};

use crate::error::AppError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".into()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| AppError::Config(format!("invalid PORT: {err}")))?,
            None => DEFAULT_PORT,
        };

        let host: IpAddr = lookup("APP_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_HOST: {err}")))?;

        Ok(Self {
            database_url,
            listen_addr: SocketAddr::new(host, port),
        })
    }
}
