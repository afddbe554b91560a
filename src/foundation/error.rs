pub type PlumeResult<T> = Result<T, PlumeError>;

#[derive(thiserror::Error, Debug)]
pub enum PlumeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("compile error: {0}")]
    Compile(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlumeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(PlumeError::config("x").to_string().contains("config error:"));
        assert!(
            PlumeError::compile("x")
                .to_string()
                .contains("compile error:")
        );
        assert!(PlumeError::render("x").to_string().contains("render error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PlumeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
