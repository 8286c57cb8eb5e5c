use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrosspostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<String>),
}

impl CrosspostError {
    /// Short error code used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            CrosspostError::Config(_) => "CONFIG_ERROR",
            CrosspostError::MissingSettings(_) => "MISSING_SETTINGS",
        }
    }
}

pub type Result<T> = std::result::Result<T, CrosspostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_lists_every_key() {
        let err = CrosspostError::MissingSettings(vec![
            "TELEGRAM_BOT_TOKEN".to_string(),
            "OPENAI_API_KEY".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required settings: TELEGRAM_BOT_TOKEN, OPENAI_API_KEY"
        );
        assert_eq!(err.code(), "MISSING_SETTINGS");
    }
}
