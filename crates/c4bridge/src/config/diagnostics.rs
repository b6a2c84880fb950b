use std::ops::Range;
use std::path::PathBuf;

/// Source information for where a diagnostic came from
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub file_path: PathBuf,
    pub content: String,
}

/// A diagnostic message that can be either a warning or an error
#[derive(Debug, Clone)]
pub enum Diagnostic {
    Warning(Warning),
    Error(Error),
}

/// Warning messages that don't prevent config loading
#[derive(Debug, Clone)]
pub enum Warning {
    EmptyConfig { file_path: PathBuf },
    NoEntities { field_path: String },
}

/// Error messages that indicate problems with the config
#[derive(Debug, Clone)]
pub enum Error {
    Validation(ValidationError),
}

/// Error type for validation failures
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field_path: String,
    pub message: String,
    pub span: Option<Range<usize>>,
    pub source: Option<SourceInfo>,
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
            span: None,
            source: None,
        }
    }

    /// Attach the location of the offending value
    pub fn at(mut self, span: Range<usize>, source: Option<&SourceInfo>) -> Self {
        self.span = Some(span);
        self.source = source.cloned();
        self
    }
}

impl From<ValidationError> for Diagnostic {
    fn from(error: ValidationError) -> Self {
        Diagnostic::Error(Error::Validation(error))
    }
}

impl Diagnostic {
    /// Returns true if this diagnostic is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::Error(_))
    }

    /// Returns true if this diagnostic is a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, Diagnostic::Warning(_))
    }
}

/// Error type for config loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration:\n{}", format_diagnostics(.0))]
    Invalid(Vec<Diagnostic>),
}

/// Format all diagnostics for display using Ariadne
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    use ariadne::Color;
    use ariadne::Label;
    use ariadne::Report;
    use ariadne::ReportKind;
    use ariadne::Source;

    let mut output = Vec::new();

    for diagnostic in diagnostics {
        match diagnostic {
            Diagnostic::Warning(Warning::EmptyConfig { file_path }) => {
                let msg = format!(
                    "Warning: Config file '{}' is empty and has no effect\n",
                    file_path.display()
                );
                output.extend_from_slice(msg.as_bytes());
            }
            Diagnostic::Warning(Warning::NoEntities { field_path }) => {
                let msg = format!("Warning: '{}' configures no entities\n", field_path);
                output.extend_from_slice(msg.as_bytes());
            }
            Diagnostic::Error(Error::Validation(error)) => match (&error.span, &error.source) {
                (Some(span), Some(source)) => {
                    let file_id = source.file_path.to_string_lossy().to_string();
                    Report::build(ReportKind::Error, (file_id.clone(), span.clone()))
                        .with_message(format!("Invalid value for '{}'", error.field_path))
                        .with_label(
                            Label::new((file_id.clone(), span.clone()))
                                .with_message(&error.message)
                                .with_color(Color::Red),
                        )
                        .finish()
                        .write((file_id, Source::from(&source.content)), &mut output)
                        .ok();
                }
                _ => {
                    let msg = format!(
                        "Validation error in '{}': {}\n",
                        error.field_path, error.message
                    );
                    output.extend_from_slice(msg.as_bytes());
                }
            },
        }
    }

    String::from_utf8_lossy(&output).to_string()
}
