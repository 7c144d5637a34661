use corrections::{CorrectionsError, Outcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Corrections(#[from] CorrectionsError),

    #[error("{0}")]
    Other(String),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Corrections(err) => corrections_message(err),
            Self::Other(msg) => msg.clone(),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

fn corrections_message(err: &CorrectionsError) -> String {
    match err {
        CorrectionsError::Aborted {
            index,
            label,
            outcome,
        } => {
            let position = index + 1;
            match outcome {
                Outcome::HttpFailure { status, detail } => format!(
                    "correction #{position} ({label}) was rejected with HTTP {status}: {detail}"
                ),
                Outcome::TransportFailure { detail } => format!(
                    "correction #{position} ({label}) could not be delivered: {detail}"
                ),
                other => format!("correction #{position} ({label}) failed: {other}"),
            }
        }
        CorrectionsError::ConfigNotFound { path } => format!(
            "unable to load application config: {} does not exist",
            path.display()
        ),
        CorrectionsError::ConfigRead { path, source } => format!(
            "unable to load application config: {} could not be read: {source}",
            path.display()
        ),
        CorrectionsError::InvalidConfig { message } => {
            format!("unable to load application config: {message}")
        }
        other => other.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}
