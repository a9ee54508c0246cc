//! System prompt loading.
//!
//! The prompt is resolved on every chat request so edits to the prompt file
//! take effect without a restart.

use std::path::PathBuf;

use tracing::warn;

/// Prompt used when neither a prompt file nor an inline prompt is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly, upbeat chat companion. \
Keep replies short and conversational, answer in the language the user writes in, \
and never claim to be a human.";

/// Where the system prompt comes from, in priority order.
#[derive(Debug, Clone, Default)]
pub struct PromptSource {
    /// Prompt file; relative paths are resolved against `base_dir`.
    pub file: Option<PathBuf>,
    /// Inline prompt text.
    pub inline: Option<String>,
    /// Base directory for a relative `file`.
    pub base_dir: PathBuf,
}

impl PromptSource {
    pub fn new(file: Option<PathBuf>, inline: Option<String>, base_dir: PathBuf) -> Self {
        Self {
            file,
            inline,
            base_dir,
        }
    }

    /// Absolute path of the prompt file, if one is configured.
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file.as_ref().map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                self.base_dir.join(file)
            }
        })
    }

    /// Load the current prompt: file → inline → [`DEFAULT_SYSTEM_PROMPT`].
    ///
    /// An unreadable prompt file is logged and skipped.
    pub async fn load(&self) -> String {
        if let Some(path) = self.resolved_file() {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => return text,
                Err(e) => warn!(path = %path.display(), "system prompt file unreadable: {e}"),
            }
        }
        if let Some(inline) = &self.inline
            && !inline.is_empty()
        {
            return inline.clone();
        }
        DEFAULT_SYSTEM_PROMPT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_default() {
        let source = PromptSource::default();
        assert_eq!(source.load().await, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn inline_beats_default() {
        let source = PromptSource::new(None, Some("inline prompt".into()), PathBuf::new());
        assert_eq!(source.load().await, "inline prompt");
    }

    #[tokio::test]
    async fn file_beats_inline_and_is_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "from file").unwrap();

        let source = PromptSource::new(
            Some(path.clone()),
            Some("inline prompt".into()),
            PathBuf::new(),
        );
        assert_eq!(source.load().await, "from file");

        std::fs::write(&path, "edited").unwrap();
        assert_eq!(source.load().await, "edited");
    }

    #[tokio::test]
    async fn relative_file_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/system.txt"), "relative").unwrap();

        let source = PromptSource::new(
            Some(PathBuf::from("prompts/system.txt")),
            None,
            dir.path().to_path_buf(),
        );
        assert_eq!(
            source.resolved_file(),
            Some(dir.path().join("prompts/system.txt"))
        );
        assert_eq!(source.load().await, "relative");
    }

    #[tokio::test]
    async fn missing_file_falls_through_to_inline() {
        let dir = tempfile::tempdir().unwrap();
        let source = PromptSource::new(
            Some(dir.path().join("missing.txt")),
            Some("inline prompt".into()),
            PathBuf::new(),
        );
        assert_eq!(source.load().await, "inline prompt");
    }
}
