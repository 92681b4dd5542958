//! Plugin Launch Arguments
//!
//! The configuration record handed to the execution layer when a plugin
//! process is started.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use serde::Serialize;

/// Default location for plugin log output
pub const DEFAULT_PLUGIN_LOG_PATH: &str = "/tmp/pulse-plugin.log";

/// Opaque control public key reserved for plugin authentication.
///
/// No signing or verification is performed with it.
#[derive(Clone, PartialEq, Eq)]
pub struct ControlPublicKey(Arc<[u8]>);

impl ControlPublicKey {
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self(Arc::from(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ControlPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ControlPublicKey({} bytes)", self.0.len())
    }
}

/// Launch configuration passed to each plugin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginArgs {
    #[serde(skip)]
    pub control_public_key: Option<ControlPublicKey>,
    pub plugin_log_path: PathBuf,
}

impl PluginArgs {
    pub fn new<P: Into<PathBuf>>(plugin_log_path: P) -> Self {
        Self {
            control_public_key: None,
            plugin_log_path: plugin_log_path.into(),
        }
    }

    pub fn with_control_public_key(mut self, key: ControlPublicKey) -> Self {
        self.control_public_key = Some(key);
        self
    }

    /// Render the launch record for the execution layer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for PluginArgs {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_LOG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = PluginArgs::default();
        assert_eq!(args.plugin_log_path, PathBuf::from(DEFAULT_PLUGIN_LOG_PATH));
        assert!(args.control_public_key.is_none());
    }

    #[test]
    fn test_json_omits_public_key() {
        let args = PluginArgs::new("/var/log/pulse/plugin.log")
            .with_control_public_key(ControlPublicKey::from_bytes(vec![1u8, 2, 3]));

        let json = args.to_json().unwrap();
        assert!(json.contains(r#""plugin_log_path":"/var/log/pulse/plugin.log""#));
        assert!(!json.contains("control_public_key"));
    }

    #[test]
    fn test_public_key_debug_hides_bytes() {
        let key = ControlPublicKey::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(format!("{:?}", key), "ControlPublicKey(4 bytes)");
        assert_eq!(key.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }
}
