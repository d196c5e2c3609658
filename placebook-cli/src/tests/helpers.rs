//! Test helpers: a resolver builder backed by canned answers and temp paths.

use super::*;
use crate::resolve::ResolverBuilder;
use camino::Utf8PathBuf;
use placebook_core::Resolver;
use placebook_core::test_support::{StubResolver, restaurant, vatican_city};
use placebook_data::NominatimConfig;
use placebook_vault::{KEY_LEN, Key};
use tempfile::TempDir;

/// 32 bytes shared by CLI scenarios that pass a literal key.
pub(super) const TEST_KEY: [u8; KEY_LEN] = *b"placebook-cli-scenario-key-bytes";

pub(super) fn test_key_text() -> String {
    Key::from_bytes(TEST_KEY).encoded()
}

/// Answers "Vatican City" searches and `W228034523` lookups.
pub(super) struct StubResolverBuilder;

impl ResolverBuilder for StubResolverBuilder {
    fn build(&self, _config: &NominatimConfig) -> Result<Box<dyn Resolver>, CliError> {
        Ok(Box::new(
            StubResolver::default()
                .with_search("Vatican City", vatican_city())
                .with_lookup("W228034523", restaurant())
                .with_lookup("w228034523&amenity=restaurant", restaurant()),
        ))
    }
}

pub(super) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(super) fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 temp path")
    }
}
