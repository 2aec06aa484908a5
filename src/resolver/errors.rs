//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::project::ProjectError;
use crate::graph::GraphError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during build-order or classpath resolution.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ResolveError {
    #[error("reference to unknown project `{name}`")]
    #[diagnostic(code(ant4eclipse::unknown_project))]
    UnknownProject {
        name: String,
        suggestions: Vec<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error("project `{project}` has malformed metadata: {message}")]
    #[diagnostic(code(ant4eclipse::malformed_configuration))]
    MalformedConfiguration {
        project: String,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("no container resolver handles `{container}` (project `{project}`)")]
    #[diagnostic(
        code(ant4eclipse::container_not_handled),
        help("Declare the container under [containers] in .ant4eclipse/config.toml")
    )]
    ContainerNotHandled { project: String, container: String },
}

impl ResolveError {
    /// Wrap a metadata failure of `project`.
    pub fn malformed(project: impl Into<String>, err: &ProjectError) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ResolveError::MalformedConfiguration {
            project: project.into(),
            path: err.path().map(|p| p.to_path_buf()),
            message,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::UnknownProject { .. } => "UNKNOWN_PROJECT",
            ResolveError::Graph(err) => err.error_code(),
            ResolveError::MalformedConfiguration { .. } => "MALFORMED_CONFIGURATION",
            ResolveError::ContainerNotHandled { .. } => "CONTAINER_NOT_HANDLED",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = match self {
            ResolveError::UnknownProject { name, suggestions } => {
                let mut diag = Diagnostic::error(format!("reference to unknown project `{}`", name));

                if !suggestions.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", suggestions.join(", ")));
                }

                diag.with_suggestion(suggestions::UNKNOWN_PROJECT)
            }

            ResolveError::Graph(GraphError::CyclicDependency { cycle }) => {
                Diagnostic::error("cyclic dependencies detected")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_suggestion("Break the cycle by removing one of the project references")
            }

            ResolveError::Graph(err @ GraphError::UnknownVertex { .. }) => Diagnostic::error(err.to_string()),

            ResolveError::MalformedConfiguration { project, path, message } => {
                let mut diag = Diagnostic::error(format!("project `{}` has malformed metadata", project))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::MALFORMED_METADATA);

                if let Some(path) = path {
                    diag = diag.with_location(path);
                }

                diag
            }

            ResolveError::ContainerNotHandled { project, container } => {
                Diagnostic::error(format!("no container resolver handles `{}`", container))
                    .with_context(format!("referenced from the classpath of `{}`", project))
                    .with_suggestion(suggestions::REGISTER_CONTAINER)
                    .with_suggestion(
                        "Enable a resolver for it under [resolvers.containers] in .ant4eclipse/config.toml",
                    )
            }
        };

        diag.with_code(self.code())
    }
}
