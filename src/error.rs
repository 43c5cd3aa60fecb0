use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YAMLParseError(#[from] serde_yaml::Error),

    /// The template identifier resolved to no file under the view root.
    #[error("Template '{template}' not found in '{view_root}'.")]
    TemplateNotFound { template: String, view_root: String },

    /// A relative identifier normalised to a path above the view root.
    #[error("Template '{template}' resolves outside of the view root '{view_root}'.")]
    OutsideViewRoot { template: String, view_root: String },

    /// The templating engine rejected the source.
    #[error("Failed to compile '{template}'. Original error: {source}")]
    CompileError {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render. Original error: {0}")]
    RenderError(#[from] minijinja::Error),

    #[error("Helper source '{path}' does not exist.")]
    HelperNotFound { path: String },

    #[error("Cannot load helper '{path}'. Original error: {e}")]
    HelperParse { path: String, e: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with viewrender's Error as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
