use thiserror::Error;

/// Errors produced while validating raw values into model types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A status string read from the datastore (or a client payload) does not
    /// belong to the closed value set for that column.
    #[error("unknown {kind} status `{value}`")]
    UnknownStatus {
        /// Which status family was being parsed.
        kind: &'static str,
        /// The offending raw value.
        value: String,
    },

    /// A link-origin discriminant other than `demand`/`direct`.
    #[error("unknown link origin `{0}`")]
    UnknownLinkOrigin(String),
}
