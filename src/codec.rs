use std::path::Path;

use crate::config::Config;
use crate::error::{Result, TreeIndexError};

/// Converts a [`Config`] to and from its persisted bytes.
///
/// `path` is only used to name the file in parse errors.
pub trait ConfigCodec: Send + Sync + 'static {
    /// Encode `config` for writing to disk.
    ///
    /// # Errors
    /// Returns `TreeIndexError::Serialize` if the config cannot be encoded.
    fn serialize(&self, config: &Config) -> Result<Vec<u8>>;

    /// Decode bytes read from `path`.
    ///
    /// # Errors
    /// Returns `TreeIndexError::Parse` if the content is malformed.
    fn deserialize(&self, bytes: &[u8], path: &Path) -> Result<Config>;
}

/// Pretty-printed JSON, the `.tgcj` on-disk format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ConfigCodec for JsonCodec {
    fn serialize(&self, config: &Config) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(config)
            .map_err(|source| TreeIndexError::Serialize { source })?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8], path: &Path) -> Result<Config> {
        serde_json::from_slice(bytes)
            .map_err(|source| TreeIndexError::Parse { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputMode, ReportFormat};
    use std::path::PathBuf;

    #[test]
    fn test_json_codec_preserves_folder_order() {
        let config = Config {
            folders: vec![PathBuf::from("/b"), PathBuf::from("/a"), PathBuf::from("/b")],
            output_mode: OutputMode::CustomDirectory,
            custom_directory: PathBuf::from("/out"),
            ..Default::default()
        };
        let bytes = JsonCodec.serialize(&config).unwrap();
        let decoded = JsonCodec.deserialize(&bytes, Path::new("x.tgcj")).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_json_codec_output_is_readable() {
        let mut config = Config::default();
        config.indexer_settings.output = ReportFormat::Json;
        let text = String::from_utf8(JsonCodec.serialize(&config).unwrap()).unwrap();
        assert!(text.contains("\"output_mode\": \"per_folder\""));
        assert!(text.contains("\"output\": \"json\""));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_json_codec_rejects_malformed() {
        let err = JsonCodec.deserialize(b"{ not json", Path::new("bad.tgcj")).unwrap_err();
        match err {
            TreeIndexError::Parse { path, .. } => assert_eq!(path, PathBuf::from("bad.tgcj")),
            other => panic!("Expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_json_codec_rejects_wrong_shape() {
        let err = JsonCodec.deserialize(br#"{"folders": 3}"#, Path::new("bad.tgcj")).unwrap_err();
        assert!(matches!(err, TreeIndexError::Parse { .. }));
    }
}
