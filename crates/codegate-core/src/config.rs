/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (with `#[serde(default = ...)]` for optional
/// settings) and call `Config::from_env()` once at startup. Field `database_url` maps to
/// env var `DATABASE_URL`.
///
/// # Panics
///
/// Panics if any required env var is missing or cannot be deserialized.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        Self::try_from_env().expect("failed to load config from environment")
    }

    /// Non-panicking variant, used by tests to load from an explicit iterator.
    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
