use std::path::PathBuf;

use quillpost::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillpostrc");
    let content = r#"
# comment
--no-inline-styles

--max-width 800

--debug-log=ingest.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_inline_styles);
    assert_eq!(flags.max_width, Some(800));
    assert_eq!(flags.debug_log, Some(PathBuf::from("ingest.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillpostrc");
    let content = "--watch\n--max-width 800\n--store drafts.json\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "quillpost".to_string(),
        "ingest".to_string(),
        "--max-width".to_string(),
        "640".to_string(),
        "--perf".to_string(),
        "cover.png".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.perf, "cli flags should be applied");
    assert_eq!(effective.max_width, Some(640), "cli should override width");
    assert_eq!(
        effective.store,
        Some(PathBuf::from("drafts.json")),
        "file config should be preserved when CLI does not override"
    );
    assert_eq!(effective.ingest_policy().max_width, 640);
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "quillpost".to_string(),
        "--max-height=480".to_string(),
        "--store=/tmp/drafts.json".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.max_height, Some(480));
    assert_eq!(flags.store, Some(PathBuf::from("/tmp/drafts.json")));
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        no_inline_styles: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.no_inline_styles);
    assert!(merged.perf);
    assert!(!merged.render_options().inline_styles);
}
