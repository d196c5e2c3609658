//! Behaviour-driven step definitions driving the resolve CLI scenarios.

use super::helpers::{StubResolverBuilder, Workspace, test_key_text};
use super::*;
use crate::resolve::run_resolve_with;
use placebook_session::SessionReport;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Outcome of one resolve invocation: the report and what was printed.
type Outcome = Result<(SessionReport, String), CliError>;

/// Resolve CLI scenario state shared between steps.
struct ResolveWorld {
    workspace: Workspace,
    key_args: RefCell<Vec<String>>,
    query_args: RefCell<Vec<String>>,
    output_args: RefCell<Vec<String>>,
    outcome: RefCell<Option<Outcome>>,
}

impl ResolveWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            key_args: RefCell::new(Vec::new()),
            query_args: RefCell::new(Vec::new()),
            output_args: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        }
    }

    fn invoke(&self, extra: &[String]) {
        let mut invocation = vec!["placebook".to_owned(), "resolve".to_owned()];
        invocation.extend(self.key_args.borrow().iter().cloned());
        invocation.extend(extra.iter().cloned());
        let outcome = Cli::try_parse_from(invocation)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| match cli.command {
                Command::Resolve(args) => {
                    let mut printed = Vec::new();
                    let report = run_resolve_with(args, &StubResolverBuilder, &mut printed)?;
                    let text = String::from_utf8(printed).expect("utf-8 output");
                    Ok((report, text))
                }
            });
        self.outcome.replace(Some(outcome));
    }

    fn printed_book(&self) -> serde_json::Value {
        let borrowed = self.outcome.borrow();
        let (_, printed) = borrowed
            .as_ref()
            .expect("command ran")
            .as_ref()
            .expect("command succeeded");
        serde_json::from_str(printed).expect("printed JSON")
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.outcome.borrow(), |outcome| {
            outcome
                .as_ref()
                .expect("command ran")
                .as_ref()
                .expect_err("command failed")
        })
    }
}

#[fixture]
fn world() -> ResolveWorld {
    ResolveWorld::new()
}

#[given("the scenario key passed with --key")]
fn key_literal(#[from(world)] world: &ResolveWorld) {
    world
        .key_args
        .borrow_mut()
        .extend([format!("--{ARG_KEY}"), test_key_text()]);
}

#[given("the scenario key saved to a key file")]
fn key_file(#[from(world)] world: &ResolveWorld) {
    let path = world.workspace.path("scenario.key");
    std::fs::write(path.as_std_path(), test_key_text()).expect("write key file");
    world
        .key_args
        .borrow_mut()
        .extend([format!("--{ARG_KEY_FILE}"), path.to_string()]);
}

#[given("a search for {query}")]
fn search_for(#[from(world)] world: &ResolveWorld, query: String) {
    world
        .query_args
        .borrow_mut()
        .extend([format!("--{ARG_SEARCH}"), query.trim_matches('"').to_owned()]);
}

#[given("a lookup for {lookup}")]
fn lookup_for(#[from(world)] world: &ResolveWorld, lookup: String) {
    world
        .query_args
        .borrow_mut()
        .extend([format!("--{ARG_LOOKUP}"), lookup.trim_matches('"').to_owned()]);
}

#[given("the book written to {name}")]
fn book_written_to(#[from(world)] world: &ResolveWorld, name: String) {
    let path = world.workspace.path(name.trim_matches('"'));
    world
        .output_args
        .borrow_mut()
        .extend([format!("--{ARG_OUTPUT}"), path.to_string()]);
}

#[when("I run the resolve command")]
fn run_command(#[from(world)] world: &ResolveWorld) {
    let mut extra = world.query_args.borrow().clone();
    extra.extend(world.output_args.borrow().iter().cloned());
    world.invoke(&extra);
}

#[when("I run the resolve command again reading {name}")]
fn run_again_reading(#[from(world)] world: &ResolveWorld, name: String) {
    let path = world.workspace.path(name.trim_matches('"'));
    world.invoke(&[format!("--{ARG_INPUT}"), path.to_string()]);
}

#[then("the printed book maps {key} to {uid}")]
fn printed_book_maps(#[from(world)] world: &ResolveWorld, key: String, uid: String) {
    let book = world.printed_book();
    assert_eq!(
        book.get(key.trim_matches('"')).and_then(|value| value.as_str()),
        Some(uid.trim_matches('"')),
        "printed book: {book}"
    );
}

#[then("the CLI reports conflicting key sources")]
fn reports_conflict(#[from(world)] world: &ResolveWorld) {
    match &*world.error() {
        CliError::ArgumentParsing(err) => {
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[then("the CLI reports an invalid {flag} value")]
fn reports_invalid_value(#[from(world)] world: &ResolveWorld, flag: String) {
    match &*world.error() {
        CliError::InvalidQuery { flag: reported, .. } => {
            assert_eq!(*reported, flag.trim_matches('"'));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

macro_rules! register_resolve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/resolve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ResolveWorld) {
            let _ = world;
        }
    };
}

register_resolve_scenario!(printing_the_book, "printing the deflated address book");
register_resolve_scenario!(
    rejecting_key_conflicts,
    "rejecting a key together with a key file"
);
register_resolve_scenario!(
    reopening_with_key_file,
    "reopening a saved address book with its key file"
);
register_resolve_scenario!(rejecting_empty_keys, "rejecting a search with an empty key");
