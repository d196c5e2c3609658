//! Behavioural tests for complete session runs against a stub resolver.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use placebook_core::Deflated;
use placebook_core::test_support::{StubResolver, restaurant, vatican_city};
use placebook_session::{KeyedQuery, SessionConfig, SessionError, SessionReport, run_session};
use placebook_vault::{Cipher, KEY_LEN, Key, KeyOrigin, KeySource};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// 32 bytes shared by the fixed-key scenarios.
const TEST_KEY: [u8; KEY_LEN] = *b"placebook-fixed-test-key-32bytes";

struct SessionWorld {
    dir: TempDir,
    resolver: StubResolver,
    config: RefCell<SessionConfig>,
    outcome: RefCell<Option<Result<SessionReport, SessionError>>>,
}

impl SessionWorld {
    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf-8 temp path")
    }

    fn update(&self, change: impl FnOnce(SessionConfig) -> SessionConfig) {
        let current = self.config.borrow().clone();
        *self.config.borrow_mut() = change(current);
    }

    fn report(&self) -> std::cell::Ref<'_, SessionReport> {
        std::cell::Ref::map(self.outcome.borrow(), |outcome| {
            outcome
                .as_ref()
                .expect("session ran")
                .as_ref()
                .expect("session succeeded")
        })
    }

    fn decrypt_export(&self, key: &Key) -> Deflated {
        let report = self.report();
        let path = report.exported.as_ref().expect("store exported");
        let plaintext = Cipher::new(key).decrypt_from_file(path).expect("decrypt export");
        Deflated::from_bytes(&plaintext).expect("deflated store")
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld {
        dir: TempDir::new().expect("tempdir"),
        resolver: StubResolver::default()
            .with_search("Vatican City", vatican_city())
            .with_lookup("W228034523", restaurant()),
        config: RefCell::new(SessionConfig::new(KeySource::Literal(String::new()))),
        outcome: RefCell::new(None),
    }
}

#[given("the fixed test key")]
fn fixed_key(#[from(world)] world: &SessionWorld) {
    let encoded = Key::from_bytes(TEST_KEY).encoded();
    world.update(|config| SessionConfig {
        key: KeySource::Literal(encoded),
        ..config
    });
}

#[given("a key generated into the working directory")]
fn generated_key(#[from(world)] world: &SessionWorld) {
    let dir = world.path("keys");
    world.update(|config| SessionConfig {
        key: KeySource::Generate { dir },
        ..config
    });
}

#[given("a search for {query}")]
fn search_for(#[from(world)] world: &SessionWorld, query: String) {
    let query = KeyedQuery::bare(query.trim_matches('"'));
    world.update(|config| config.with_search(query));
}

#[given("a lookup for {osm_ids}")]
fn lookup_for(#[from(world)] world: &SessionWorld, osm_ids: String) {
    let lookup = KeyedQuery::bare(osm_ids.trim_matches('"'));
    world.update(|config| config.with_lookup(lookup));
}

#[given("an output file")]
fn output_file(#[from(world)] world: &SessionWorld) {
    let path = world.path("book.dat");
    world.update(|config| config.with_output(path));
}

#[given("an input file that does not exist")]
fn missing_input(#[from(world)] world: &SessionWorld) {
    let path = world.path("absent.dat");
    world.update(|config| config.with_input(path));
}

#[given("an input file holding garbage")]
fn garbage_input(#[from(world)] world: &SessionWorld) {
    let path = world.path("corrupt.dat");
    std::fs::write(path.as_std_path(), b"this is not a sealed store").expect("write garbage");
    world.update(|config| config.with_input(path));
}

#[when("the session runs")]
fn session_runs(#[from(world)] world: &SessionWorld) {
    let config = world.config.borrow().clone();
    *world.outcome.borrow_mut() = Some(run_session(&config, &world.resolver));
}

#[then("the store holds {count} entries")]
fn store_holds(#[from(world)] world: &SessionWorld, count: usize) {
    assert_eq!(world.report().store.len(), count);
}

#[then("the exported file decrypts to the deflated store")]
fn export_matches(#[from(world)] world: &SessionWorld) {
    let decrypted = world.decrypt_export(&Key::from_bytes(TEST_KEY));
    assert_eq!(decrypted, world.report().store.deflate());
    assert_eq!(
        decrypted
            .get("r999&boundary=administrative")
            .map(|uid| uid.as_str()),
        Some("r999&boundary=administrative")
    );
    assert_eq!(
        decrypted
            .get("w228034523&amenity=restaurant")
            .map(|uid| uid.as_str()),
        Some("w228034523&amenity=restaurant")
    );
}

#[then("the session fails with a decryption error")]
fn fails_decryption(#[from(world)] world: &SessionWorld) {
    let outcome = world.outcome.borrow();
    let err = outcome
        .as_ref()
        .expect("session ran")
        .as_ref()
        .expect_err("session failed");
    assert!(err.is_decryption(), "expected decryption failure, got {err:?}");
}

#[then("the resolver was never called")]
fn resolver_untouched(#[from(world)] world: &SessionWorld) {
    assert!(world.resolver.calls().is_empty());
}

#[then("the report names the saved key file")]
fn names_key_file(#[from(world)] world: &SessionWorld) {
    let report = world.report();
    let KeyOrigin::Generated(path) = &report.key_origin else {
        panic!("expected a generated key, got {:?}", report.key_origin);
    };
    assert!(path.starts_with(world.path("keys")));
    assert!(path.as_std_path().is_file());
}

#[then("the saved key decrypts the exported file")]
fn saved_key_decrypts(#[from(world)] world: &SessionWorld) {
    let key_path = match &world.report().key_origin {
        KeyOrigin::Generated(path) => path.clone(),
        other => panic!("expected a generated key, got {other:?}"),
    };
    let key = Key::load(&key_path).expect("load saved key");
    let decrypted = world.decrypt_export(&key);
    assert_eq!(decrypted.len(), 1);
}

#[scenario(path = "tests/features/session.feature", index = 0)]
fn fresh_session_exports(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 1)]
fn missing_input_starts_empty(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 2)]
fn corrupt_input_aborts_early(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 3)]
fn generated_key_is_reported(world: SessionWorld) {
    let _ = world;
}
