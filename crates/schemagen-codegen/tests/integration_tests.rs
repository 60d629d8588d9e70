//! End-to-end generation tests
//!
//! Each test introspects a `MockConnection` and generates into a temporary
//! directory.
//!
//! ```bash
//! cargo test -p schemagen-codegen --test integration_tests
//! ```

mod fixtures;

use pretty_assertions::assert_eq;
use schemagen_catalog::{CatalogCategory, ConnectionError, SnapshotConnection};
use regex::Regex;
use schemagen_codegen::{
    generate, GenerateError, GenerateOptions, SupportFile, SupportFiles, TargetProfile, VersionGuard, Flavor,
    GENERATOR_VERSION,
};
use schemagen_core::{ServerVersion, Target};
use std::collections::BTreeMap;

// =============================================================================
// Helper Functions
// =============================================================================

fn options(dir: &std::path::Path, target: Target) -> GenerateOptions {
    GenerateOptions::new(dir, target).with_generator_version("1.0.0")
}

/// Resolve `specifier` against the directory of `file`, both relative to the
/// output root
fn resolve_relative(file: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = file.split('/').collect();
    segments.pop();

    for part in specifier.split('/') {
        match part {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Every relative specifier in the tree, as `(file, specifier)`
fn relative_references(tree: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let pattern = Regex::new(r#"(?:\bfrom\s*|\bimport\s*|\brequire\(\s*)["']([^"'\n]+)["']"#).unwrap();

    tree.iter()
        .flat_map(|(file, contents)| {
            pattern
                .captures_iter(contents)
                .map(|caps| caps[1].to_string())
                .filter(|spec| spec.starts_with('.'))
                .map(|spec| (file.clone(), spec))
                .collect::<Vec<_>>()
        })
        .collect()
}

// =============================================================================
// Concrete Scenario
// =============================================================================

#[tokio::test]
async fn test_user_schema_ts_target() {
    let dir = tempfile::tempdir().unwrap();
    let conn = fixtures::connection(&fixtures::user_catalog());

    let summary = generate(&conn, &options(dir.path(), Target::Ts)).await.unwrap();

    assert_eq!(summary.object_types, 1);
    assert_eq!(summary.scalars, 1);
    assert_eq!(summary.sync.removed, 0);

    let tree = fixtures::read_tree(dir.path());

    let default = &tree["modules/default.ts"];
    assert!(default.starts_with("// GENERATED by schemagen - do not modify\n"));
    assert!(default.contains("import * as _std from \"./std\";"));
    assert!(default.contains("\"name\": $.PropertyDesc<_std.$str, $.Cardinality.One, false, false, false, false>;"));
    assert!(default.contains("export { $User, User };"));

    let index = &tree["index.ts"];
    assert!(index.contains("import * as _default from \"./modules/default\";"));
    assert!(index.contains("\"default\": typeof _default;"));
    assert!(index.contains("  \"default\": _default,"));
    assert!(index.contains("export default __defaultExports;"));
    assert!(index.contains("export { Cardinality } from \"./reflection\";"));
    assert!(index.contains("export type { Set };"));

    assert_eq!(tree["config.json"], "// GENERATED by schemagen - do not modify\n{\"target\":\"ts\"}\n");
    assert!(tree.contains_key("syntax/syntax.ts"));
    assert!(tree.contains_key("syntax/literal.ts"));
    assert!(!tree.contains_key("operators.ts"));
    assert!(conn.is_closed());
}

// =============================================================================
// Idempotence and Cleanup
// =============================================================================

#[tokio::test]
async fn test_second_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fixtures::blog_catalog();

    let first = generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Esm))
        .await
        .unwrap();
    let before = fixtures::read_tree(dir.path());

    let second = generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Esm))
        .await
        .unwrap();
    let after = fixtures::read_tree(dir.path());

    assert!(first.sync.written > 0);
    assert_eq!(second.sync.written, 0);
    assert_eq!(second.sync.removed, 0);
    assert_eq!(second.sync.unchanged, first.sync.written);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_removed_module_file_deleted() {
    let dir = tempfile::tempdir().unwrap();

    generate(&fixtures::connection(&fixtures::blog_catalog()), &options(dir.path(), Target::Ts))
        .await
        .unwrap();
    assert!(dir.path().join("modules/blog.ts").exists());

    let summary = generate(&fixtures::connection(&fixtures::user_catalog()), &options(dir.path(), Target::Ts))
        .await
        .unwrap();

    assert!(summary.sync.removed > 0);
    assert!(!dir.path().join("modules/blog.ts").exists());
    assert!(!dir.path().join("operators.ts").exists());
    assert!(dir.path().join("modules/default.ts").exists());
}

#[tokio::test]
async fn test_switching_target_replaces_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fixtures::user_catalog();

    generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Ts))
        .await
        .unwrap();
    generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Cjs))
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    assert!(!tree.keys().any(|path| path.ends_with(".ts") && !path.ends_with(".d.ts")));
    assert!(tree.contains_key("index.js"));
    assert_eq!(tree["config.json"].lines().nth(1), Some("{\"target\":\"cjs\"}"));
}

// =============================================================================
// Surface Merging
// =============================================================================

#[tokio::test]
async fn test_default_module_wins_key_collision() {
    let dir = tempfile::tempdir().unwrap();

    generate(&fixtures::connection(&fixtures::blog_catalog()), &options(dir.path(), Target::Ts))
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    let index = &tree["index.ts"];
    let surface_type = index
        .lines()
        .find(|l| l.starts_with("type __defaultExports = "))
        .unwrap();

    // `_std` comes after `_default`, so it omits `len` and is spread first
    let std_part = surface_type
        .split(" & ")
        .find(|part| part.starts_with("Omit<typeof _std,"))
        .unwrap();
    assert!(std_part.contains("\"len\""));
    assert!(surface_type.contains("Omit<typeof _default, "));
    assert!(surface_type.contains("typeof $syntax"));

    let spread_std = index.find("  ..._std,").unwrap();
    let spread_default = index.find("  ..._default,").unwrap();
    let spread_op = index.find("  ..._op,").unwrap();
    assert!(spread_std < spread_default);
    assert!(spread_default < spread_op);
    assert!(index.contains("  \"blog\": _blog,"));
}

#[tokio::test]
async fn test_empty_operator_module_skipped() {
    let dir = tempfile::tempdir().unwrap();

    generate(&fixtures::connection(&fixtures::user_catalog()), &options(dir.path(), Target::Ts))
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    let index = &tree["index.ts"];
    assert!(!index.contains("_op"));
    assert!(index.contains("..._set,"));
}

// =============================================================================
// Target Profiles
// =============================================================================

#[tokio::test]
async fn test_every_target_uses_its_extensions() {
    let expectations: [(Target, &[&str], &str); 5] = [
        (Target::Ts, &["index.ts", "modules/default.ts", "syntax/syntax.ts"], "from \"./modules/default\";"),
        (Target::Mts, &["index.mts", "modules/default.mts", "syntax/syntax.mts"], "from \"./modules/default.mjs\";"),
        (Target::Deno, &["index.ts", "modules/default.ts", "syntax/syntax.ts"], "from \"./modules/default.ts\";"),
        (
            Target::Esm,
            &["index.mjs", "index.d.mts", "modules/default.mjs", "modules/default.d.mts", "syntax/syntax.mjs"],
            "from \"./modules/default.mjs\";",
        ),
        (
            Target::Cjs,
            &["index.js", "index.d.ts", "modules/default.js", "modules/default.d.ts", "syntax/syntax.d.ts"],
            "require(\"./modules/default\");",
        ),
    ];

    for (target, files, import) in expectations {
        let dir = tempfile::tempdir().unwrap();
        generate(&fixtures::connection(&fixtures::blog_catalog()), &options(dir.path(), target))
            .await
            .unwrap();

        let tree = fixtures::read_tree(dir.path());
        for file in files {
            assert!(tree.contains_key(*file), "{target}: missing {file}");
        }

        let entry = files[0];
        assert!(tree[entry].contains(import), "{target}: {entry} lacks {import}");
    }
}

#[tokio::test]
async fn test_every_relative_reference_resolves() {
    for target in Target::ALL {
        let dir = tempfile::tempdir().unwrap();
        let conn = fixtures::connection(&fixtures::blog_catalog_with_type_only_module());
        generate(&conn, &options(dir.path(), target)).await.unwrap();

        let profile = TargetProfile::for_target(target);
        let mut extensions: Vec<&str> = profile.passes.iter().map(|pass| pass.extension).collect();
        extensions.sort_by_key(|ext| std::cmp::Reverse(ext.len()));

        let tree = fixtures::read_tree(dir.path());
        let references = relative_references(&tree);
        assert!(!references.is_empty(), "{target}: no relative references found");

        for (file, specifier) in references {
            let Some(extension) = extensions.iter().find(|ext| file.ends_with(**ext)) else {
                continue;
            };

            let base = if profile.import_suffix.is_empty() {
                let last = specifier.rsplit('/').next().unwrap_or_default();
                assert!(!last.contains('.'), "{target}: {file} imports {specifier} with an extension");
                specifier.as_str()
            } else {
                specifier.strip_suffix(profile.import_suffix).unwrap_or_else(|| {
                    panic!("{target}: {file} imports {specifier} without {}", profile.import_suffix)
                })
            };

            let resolved = format!("{}{}", resolve_relative(&file, base), extension);
            assert!(
                tree.contains_key(&resolved),
                "{target}: {file} imports {specifier} but {resolved} was not emitted"
            );
        }
    }
}

#[tokio::test]
async fn test_type_only_module_emitted_for_runtime_targets() {
    let dir = tempfile::tempdir().unwrap();
    let conn = fixtures::connection(&fixtures::blog_catalog_with_type_only_module());

    generate(&conn, &options(dir.path(), Target::Esm)).await.unwrap();

    let tree = fixtures::read_tree(dir.path());
    assert!(tree["index.mjs"].contains("import * as _extra from \"./modules/extra.mjs\";"));
    assert!(tree.contains_key("modules/extra.mjs"));
    assert!(tree["modules/extra.d.mts"].contains("type $Base = $.ScalarType<\"extra::Base\""));
    assert!(!tree["modules/extra.mjs"].contains("$Base"));
}

#[tokio::test]
async fn test_deno_rewrites_runtime_paths() {
    let dir = tempfile::tempdir().unwrap();

    generate(&fixtures::connection(&fixtures::user_catalog()), &options(dir.path(), Target::Deno))
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    assert!(tree["reflection.ts"].contains("export * from \"edgedb/_src/reflection/index\";"));
    assert!(tree["index.ts"].contains("from \"edgedb/_src/version\";"));
    assert!(!tree.values().any(|contents| contents.contains("edgedb/dist/")));
}

#[tokio::test]
async fn test_cjs_declarations_keep_types() {
    let dir = tempfile::tempdir().unwrap();

    generate(&fixtures::connection(&fixtures::blog_catalog()), &options(dir.path(), Target::Cjs))
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    let js = &tree["modules/default.js"];
    let dts = &tree["modules/default.d.ts"];

    assert!(js.contains("exports.User = User;"));
    assert!(!js.contains("λShape"));
    assert!(dts.contains("declare const User: "));
    assert!(dts.contains("export type { $UserλShape };"));
    assert!(!dts.contains("require("));
}

// =============================================================================
// Version Guard
// =============================================================================

#[tokio::test]
async fn test_index_embeds_generator_version() {
    let dir = tempfile::tempdir().unwrap();
    let opts = GenerateOptions::new(dir.path(), Target::Ts).with_generator_version("9.9.9");

    generate(&fixtures::connection(&fixtures::user_catalog()), &opts)
        .await
        .unwrap();

    let tree = fixtures::read_tree(dir.path());
    let index = &tree["index.ts"];
    assert!(index.contains("import { version as runtimeVersion } from \"edgedb/dist/version\";"));
    assert!(index.contains("const generatorVersion = \"9.9.9\";"));
    assert!(index.contains("if (runtimeVersion !== generatorVersion) {"));
}

#[test]
fn test_version_mismatch_names_both_versions() {
    let err = VersionGuard::new(GENERATOR_VERSION).check("0.0.1-old").unwrap_err();

    assert!(matches!(err, GenerateError::VersionMismatch { .. }));
    assert_eq!(
        err.to_string(),
        format!(
            "The query builder was generated by version {}, but the runtime library is version 0.0.1-old. Regenerate the query builder.",
            GENERATOR_VERSION
        )
    );
}

// =============================================================================
// Failure Handling
// =============================================================================

#[tokio::test]
async fn test_connection_closed_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let conn = fixtures::connection(&fixtures::user_catalog()).with_connection_failure();

    let result = generate(&conn, &options(dir.path(), Target::Ts)).await;

    assert!(matches!(result, Err(GenerateError::Connection(ConnectionError::Connect(_)))));
    assert!(conn.is_closed());
    assert!(fixtures::read_tree(dir.path()).is_empty());
}

#[tokio::test]
async fn test_failed_introspection_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fixtures::blog_catalog();
    generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Ts))
        .await
        .unwrap();
    let before = fixtures::read_tree(dir.path());

    let conn = fixtures::connection(&fixtures::user_catalog())
        .with_error(CatalogCategory::Functions, ConnectionError::Query("timeout".to_string()));
    let result = generate(&conn, &options(dir.path(), Target::Ts)).await;

    assert!(matches!(result, Err(GenerateError::Introspection(_))));
    assert!(conn.is_closed());
    assert_eq!(fixtures::read_tree(dir.path()), before);
}

#[tokio::test]
async fn test_invalid_support_file_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fixtures::user_catalog();
    generate(&fixtures::connection(&catalog), &options(dir.path(), Target::Ts))
        .await
        .unwrap();
    let before = fixtures::read_tree(dir.path());

    let support = SupportFiles::from_files(vec![SupportFile {
        stem: "syntax/syntax".to_string(),
        flavor: Flavor::Ts,
        contents: "export * from \"../reflection\";\n".to_string(),
    }]);
    let result = generate(
        &fixtures::connection(&fixtures::blog_catalog()),
        &options(dir.path(), Target::Ts).with_support(support),
    )
    .await;

    assert!(matches!(result, Err(GenerateError::InvalidTargetFile { .. })));
    assert_eq!(fixtures::read_tree(dir.path()), before);
}

// =============================================================================
// Connections and Versions
// =============================================================================

#[tokio::test]
async fn test_generate_from_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let document = SnapshotConnection::document(&fixtures::blog_catalog(), ServerVersion::new(4, 2));
    let conn = SnapshotConnection::from_json(&document.to_string()).unwrap();

    let summary = generate(&conn, &options(dir.path(), Target::Mts)).await.unwrap();

    assert_eq!(summary.server_version, ServerVersion::new(4, 2));
    assert_eq!(summary.globals, 1);
    let tree = fixtures::read_tree(dir.path());
    assert!(tree["modules/default.mts"].contains("const $default__globals: $default__globalsType = {"));
    assert!(tree["modules/blog.mts"].contains("import * as _default from \"./default.mjs\";"));
}

#[tokio::test]
async fn test_old_server_generates_without_globals() {
    let dir = tempfile::tempdir().unwrap();
    let conn = fixtures::connection(&fixtures::blog_catalog()).with_version(ServerVersion::new(1, 4));

    let summary = generate(&conn, &options(dir.path(), Target::Ts)).await.unwrap();

    assert_eq!(summary.globals, 0);
    let tree = fixtures::read_tree(dir.path());
    let default = &tree["modules/default.ts"];
    assert!(!default.contains("__globals"));
}
