//! The resolve-and-persist session.
//!
//! A session walks a fixed sequence of states:
//!
//! ```text
//! Init → KeyResolved → InputLoaded → SearchResolved → LookupResolved
//!      → Combined → [Exported] → Done
//! ```
//!
//! There are no back-edges. The first failure aborts the run and is returned
//! as is; in particular a corrupt input store aborts before the resolver is
//! ever called.

use std::fmt;

use camino::Utf8PathBuf;
use log::{debug, info};
use placebook_core::{Deflated, Record, RecordStore, ResolveError, Resolver};
use placebook_vault::{Cipher, KeyManager, KeyOrigin, VaultError};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::query::KeyedQuery;

/// Progress markers of a session run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    /// Nothing done yet.
    Init,
    /// The key is available.
    KeyResolved,
    /// The input store is loaded, or known to be absent.
    InputLoaded,
    /// Search queries are resolved.
    SearchResolved,
    /// Lookups are resolved.
    LookupResolved,
    /// Input, search and lookup stores are merged.
    Combined,
    /// The combined store has been written.
    Exported,
    /// The run finished.
    Done,
}

impl SessionState {
    /// Lower-case label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::KeyResolved => "key-resolved",
            Self::InputLoaded => "input-loaded",
            Self::SearchResolved => "search-resolved",
            Self::LookupResolved => "lookup-resolved",
            Self::Combined => "combined",
            Self::Exported => "exported",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// The combined store.
    pub store: RecordStore,
    /// How the key was obtained; a generated key carries its saved path.
    pub key_origin: KeyOrigin,
    /// Where the store was written, if it was.
    pub exported: Option<Utf8PathBuf>,
    /// States visited, in order, from `Init` to `Done`.
    pub states: Vec<SessionState>,
}

struct Progress {
    visited: Vec<SessionState>,
}

impl Progress {
    fn new() -> Self {
        Self {
            visited: vec![SessionState::Init],
        }
    }

    fn advance(&mut self, next: SessionState) {
        if let Some(current) = self.visited.last() {
            debug!("session: {current} -> {next}");
        }
        self.visited.push(next);
    }
}

/// Run one session against `resolver`.
///
/// # Errors
///
/// Returns the first [`SessionError`] raised by key resolution, input
/// decryption or decoding, any resolver call, or the export.
///
/// # Examples
///
/// ```
/// use placebook_core::test_support::{restaurant, vatican_city, StubResolver};
/// use placebook_session::{run_session, KeyedQuery, SessionConfig};
/// use placebook_vault::{Key, KeySource};
///
/// let key = Key::from_bytes([7; 32]).encoded();
/// let resolver = StubResolver::default()
///     .with_search("Vatican City", vatican_city())
///     .with_lookup("W228034523", restaurant());
/// let config = SessionConfig::new(KeySource::Literal(key))
///     .with_search(KeyedQuery::bare("Vatican City"))
///     .with_lookup(KeyedQuery::keyed("Dinner", "W228034523"));
///
/// let report = run_session(&config, &resolver)?;
/// assert_eq!(report.store.len(), 2);
/// assert!(report.store.get("Dinner").is_some());
/// # Ok::<(), placebook_session::SessionError>(())
/// ```
pub fn run_session<R>(config: &SessionConfig, resolver: &R) -> Result<SessionReport, SessionError>
where
    R: Resolver + ?Sized,
{
    let mut progress = Progress::new();

    let resolved = KeyManager.resolve(&config.key)?;
    let cipher = Cipher::new(&resolved.key);
    progress.advance(SessionState::KeyResolved);

    let input = load_input(config, &cipher, resolver)?;
    progress.advance(SessionState::InputLoaded);

    let searched = resolve_all(&config.searches, |query| resolver.search(query))?;
    progress.advance(SessionState::SearchResolved);

    let looked_up = resolve_all(&config.lookups, |osm_ids| resolver.lookup(osm_ids))?;
    progress.advance(SessionState::LookupResolved);

    let store = input.combine(&searched).combine(&looked_up);
    progress.advance(SessionState::Combined);

    let exported = match &config.output {
        Some(path) => {
            cipher.encrypt_to_file(&store.to_bytes()?, path)?;
            info!("exported {} entries to {path}", store.len());
            progress.advance(SessionState::Exported);
            Some(path.clone())
        }
        None => None,
    };
    progress.advance(SessionState::Done);

    Ok(SessionReport {
        store,
        key_origin: resolved.origin,
        exported,
        states: progress.visited,
    })
}

fn load_input<R>(
    config: &SessionConfig,
    cipher: &Cipher,
    resolver: &R,
) -> Result<RecordStore, SessionError>
where
    R: Resolver + ?Sized,
{
    let Some(path) = &config.input else {
        debug!("no input store given; starting empty");
        return Ok(RecordStore::new());
    };
    let plaintext = match cipher.decrypt_from_file(path) {
        Ok(plaintext) => plaintext,
        Err(VaultError::NotFound { .. }) => {
            info!("input store {path} does not exist; starting empty");
            return Ok(RecordStore::new());
        }
        Err(err) => return Err(err.into()),
    };
    let deflated = Deflated::from_bytes(&plaintext)?;
    info!("inflating {} entries from {path}", deflated.len());
    Ok(RecordStore::inflate(&deflated, resolver)?)
}

fn resolve_all<F>(queries: &[KeyedQuery], mut resolve: F) -> Result<RecordStore, ResolveError>
where
    F: FnMut(&str) -> Result<Record, ResolveError>,
{
    let mut store = RecordStore::new();
    for query in queries {
        let record = resolve(query.query())?;
        let key = store.add(record, query.key().map(str::to_owned));
        debug!("stored {query} as {key:?}");
    }
    Ok(store)
}
