//! End-to-end advisory runs through the real TypeScript parser.
//!
//! These tests exercise the whole pipeline the way the engine drives it:
//! source text in, extraction, scoring, solution search, rebuild, job out.
//! Fixtures are chosen so the winning move is forced by a single axis.

use std::fs;

use tempfile::TempDir;

use nudge::advisor::{advise, AdviseRequest, AdvisorConfig};
use nudge::engine::Engine;
use nudge::error::NudgeError;
use nudge::job::Job;
use nudge::score::Weights;
use nudge::search::MoveReason;
use nudge::types::Position;
use nudge_typescript::{SourceFlavor, TypeScriptExtractor};

/// `ma` calls `mb`, `mb` calls `mc`, defined caller-first: two forward
/// references. The best single move lifts `mb` ahead of `ma`.
const CALL_CHAIN: &str = "function ma() { return mb(); }\n\
                          function mb() { return mc(); }\n\
                          function mc() { return 1; }\n";

/// Kinds interleave variable/function/variable/function; names are chosen
/// so every pairwise name distance is identical and only the kind axis can
/// change with a move.
const MIXED_KINDS: &str =
    "const aa = 1;\nfunction ab() {}\nconst ac = 2;\nfunction ad() {}\n";

/// No dependencies, uniform kinds; the two `fetch*` functions are far more
/// similar to each other than either is to `parseConfig`.
const LOOKALIKE_NAMES: &str = "function fetchUser() {}\n\
                               function parseConfig() {}\n\
                               function fetchOrder() {}\n";

/// Three variable/function pairs where each function reads only the
/// variable declared right above it: backward references only.
const PAIRED_HELPERS: &str = "const va = 1;\n\
                              function fa() { return va; }\n\
                              const vb = 2;\n\
                              function fb() { return vb; }\n\
                              const vc = 3;\n\
                              function fc() { return vc; }\n";

/// `alpha`'s header shares `x`'s line while its body continues below, so
/// that whole region is immovable; only `a` and `b` can be reordered.
const SHARED_LINE_HEADER: &str = "const x = 1; function alpha() {\n  beta();\n}\n\
                                  function a() { b(); }\n\
                                  function b() {}\n";

fn advise_ts(source: &str, config: &AdvisorConfig) -> Result<Option<Job>, NudgeError> {
    let extractor = TypeScriptExtractor::new(SourceFlavor::Ts);
    let request = AdviseRequest {
        file_path: "src/app.ts",
        file_text: source,
        cursor: Position::new(0, 0),
    };
    advise(&extractor, &request, config)
}

// ============================================================================
// Axis-driven moves
// ============================================================================

#[test]
fn dependency_chain_is_reordered_through_the_real_parser() {
    let job = advise_ts(CALL_CHAIN, &AdvisorConfig::default())
        .expect("advise")
        .expect("an improving move");

    assert_eq!((job.old_index, job.new_index), (0, 1));
    assert_eq!(job.reason, MoveReason::OrderedDependencies);
    assert_eq!(job.title, "Move 'ma' later (more ordered dependencies)");
    assert_eq!(
        job.text,
        "function mb() { return mc(); }\nfunction ma() { return mb(); }\nfunction mc() { return 1; }\n"
    );
    assert!((job.coefficients.dependency - 1.0 / 3.0).abs() < 1e-12);
    // Cursor sat at the top of the moved declaration and travels with it.
    assert_eq!(job.position, Position::new(1, 0));
}

#[test]
fn kind_grouping_drives_the_move_when_nothing_else_differs() {
    let job = advise_ts(MIXED_KINDS, &AdvisorConfig::default())
        .expect("advise")
        .expect("an improving move");

    assert_eq!(job.reason, MoveReason::SameKindBlocks);
    assert_eq!(job.title, "Move 'ab' later (more same-type blocks)");
    assert_eq!(
        job.text,
        "const aa = 1;\nconst ac = 2;\nfunction ab() {}\nfunction ad() {}\n"
    );
}

#[test]
fn zero_kind_weight_silences_the_kind_axis() {
    let config = AdvisorConfig {
        weights: Weights::new(1.0, 1.0, 0.0),
        ..AdvisorConfig::default()
    };
    let advice = advise_ts(MIXED_KINDS, &config).expect("advise");
    assert!(advice.is_none());
}

#[test]
fn lookalike_names_are_brought_together() {
    let job = advise_ts(LOOKALIKE_NAMES, &AdvisorConfig::default())
        .expect("advise")
        .expect("an improving move");

    assert_eq!(job.reason, MoveReason::NameSimilarity);
    assert_eq!(job.title, "Move 'fetchUser' later (more name similarity)");
    assert_eq!(
        job.text,
        "function parseConfig() {}\nfunction fetchUser() {}\nfunction fetchOrder() {}\n"
    );
}

#[test]
fn backward_reads_are_not_dependency_violations() {
    // The dependency axis sees nothing to fix, so with the other axes
    // silenced the file is left alone.
    let dep_only = AdvisorConfig {
        weights: Weights::new(1.0, 0.0, 0.0),
        ..AdvisorConfig::default()
    };
    assert!(advise_ts(PAIRED_HELPERS, &dep_only)
        .expect("advise")
        .is_none());

    // With all axes on, grouping wins without disturbing any read: the
    // moved function still follows the variable it reads.
    let job = advise_ts(PAIRED_HELPERS, &AdvisorConfig::default())
        .expect("advise")
        .expect("an improving move");
    assert_eq!(job.reason, MoveReason::SameKindBlocks);
    assert_eq!(job.title, "Move 'fa' later (more same-type blocks)");
    assert!(job.coefficients.dependency.abs() < 1e-12);
    assert_eq!(
        job.text,
        "const va = 1;\nconst vb = 2;\nfunction fa() { return va; }\nfunction fb() { return vb; }\nconst vc = 3;\nfunction fc() { return vc; }\n"
    );
}

#[test]
fn shared_line_declarations_are_never_relocated() {
    // With only `beta` left extractable there is nothing to reorder.
    let lone = "const x = 1; function alpha() {\n  beta();\n}\nfunction beta() {}\n";
    assert!(advise_ts(lone, &AdvisorConfig::default())
        .expect("advise")
        .is_none());

    // With a reorderable pair below, the move swaps `a` and `b` and the
    // entangled region survives byte for byte.
    let job = advise_ts(SHARED_LINE_HEADER, &AdvisorConfig::default())
        .expect("advise")
        .expect("an improving move");
    assert_eq!(job.reason, MoveReason::OrderedDependencies);
    assert_eq!(job.title, "Move 'a' later (more ordered dependencies)");
    assert_eq!(
        job.text,
        "const x = 1; function alpha() {\n  beta();\n}\nfunction b() {}\nfunction a() { b(); }\n"
    );
}

#[test]
fn applying_the_advice_reaches_a_fixed_point() {
    // Re-run the advisor on its own output until it is satisfied; the
    // chain fixture needs two moves to clear both forward references.
    let config = AdvisorConfig::default();
    let mut text = CALL_CHAIN.to_string();
    let mut rounds = 0;
    while let Some(job) = advise_ts(&text, &config).expect("advise") {
        text = job.text;
        rounds += 1;
        assert!(rounds <= 4, "advice should converge");
    }

    assert_eq!(
        text,
        "function mc() { return 1; }\nfunction mb() { return mc(); }\nfunction ma() { return mb(); }\n"
    );
}

// ============================================================================
// Engine round trips
// ============================================================================

#[test]
fn propose_then_apply_rewrites_the_file_on_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("app.ts");
    fs::write(&path, CALL_CHAIN).expect("write fixture");
    let path = path.to_string_lossy().to_string();

    let mut engine = Engine::new(AdvisorConfig::default());
    let proposed = engine
        .propose_file(&path, Position::new(0, 0))
        .expect("propose")
        .expect("an improving move");
    // Proposing never touches the file.
    assert_eq!(fs::read_to_string(&path).expect("read"), CALL_CHAIN);

    let applied = engine
        .apply_file(&path)
        .expect("apply")
        .expect("an improving move");
    assert_eq!(applied.text, proposed.text);
    assert_eq!(fs::read_to_string(&path).expect("read"), applied.text);
    assert!(engine.store().is_empty());
}

#[test]
fn accept_fails_once_the_buffer_has_drifted() {
    let mut engine = Engine::new(AdvisorConfig::default());
    let job = engine
        .advise_text("app.ts", CALL_CHAIN, Position::new(0, 0))
        .expect("advise")
        .expect("an improving move");

    // The caller edited `mc` after the advice was produced.
    let drifted = CALL_CHAIN.replace("return 1", "return 2");
    let err = engine.accept(&job.id, &drifted).unwrap_err();
    assert!(matches!(err, NudgeError::StaleJob { .. }));

    // Unchanged text still accepts and retires the job.
    let accepted = engine.accept(&job.id, CALL_CHAIN).expect("accept");
    assert_eq!(accepted.id, job.id);
    assert!(engine.store().is_empty());
}
