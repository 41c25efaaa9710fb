use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub strict_allergy_enforcement: bool,
    pub rotation_lookback_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let engine = EngineConfig {
            strict_allergy_enforcement: std::env::var("STRICT_ALLERGY_ENFORCEMENT")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
            rotation_lookback_days: std::env::var("ROTATION_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        Ok(Self {
            database_url,
            engine,
        })
    }
}
