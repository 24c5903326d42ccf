use crate::model::Lang;

/// Failure of a weather lookup.
///
/// In aggregate mode every variant is reduced to "no record for this location";
/// only a missing credential, detected before any request, fails the whole call.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No API key configured for OpenWeather. Hint: run `skyboard configure` or set SKYBOARD_API_KEY.")]
    Credential,
    #[error("No weather data found for '{0}'")]
    NotFound(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Which surface a failure is being reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    /// A single searched city.
    Single,
    /// The popular-cities panel.
    Aggregate,
}

impl WeatherError {
    pub fn is_credential(&self) -> bool {
        matches!(self, WeatherError::Credential)
    }

    /// Localized text for end users.
    ///
    /// A missing credential gets its own message; lookup failures share one
    /// generic text per scope and the specific kind is only logged.
    pub fn user_message(&self, lang: Lang, scope: FailureScope) -> &'static str {
        if self.is_credential() {
            return match lang {
                Lang::Es => "API key no configurada. Ejecuta `skyboard configure`.",
                Lang::En => "API key not configured. Run `skyboard configure`.",
            };
        }

        match (scope, lang) {
            (FailureScope::Single, Lang::Es) => "No se pudo encontrar la ciudad especificada",
            (FailureScope::Single, Lang::En) => "The specified city could not be found",
            (FailureScope::Aggregate, Lang::Es) => "No se pudieron cargar los datos del clima",
            (FailureScope::Aggregate, Lang::En) => "Weather data could not be loaded",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Transport(format!("request timed out: {err}"))
        } else {
            WeatherError::Transport(err.to_string())
        }
    }
}
