use gitstate::git::parser::*;
use gitstate::git::{RepositoryLocator, split_args};

/// Test parsing completely empty git output
#[test]
fn test_parse_empty_outputs() {
    assert!(parse_log("").unwrap().is_empty());
    assert!(parse_branch_list("").is_empty());
    assert!(parse_stash_list("").is_empty());
    assert!(parse_branch_names("", true, None).is_empty());
}

/// A pipe in the message shifts fields; only the first four survive
#[test]
fn test_parse_log_pipe_in_message() {
    let result = parse_log("abc1234|Jane|2024-01-15|left | right").unwrap();
    assert_eq!(result[0].message, "left ");
}

#[test]
fn test_parse_log_bad_date_is_kept_verbatim() {
    let result = parse_log("abc1234|Jane|yesterday|msg").unwrap();
    assert_eq!(result[0].date, "yesterday");
    assert!(result[0].parsed_date().is_none());
}

#[test]
fn test_parse_log_unicode_author() {
    let result = parse_log("abc1234|Zoë Ångström|2024-01-15|Añadir ñ").unwrap();
    assert_eq!(result[0].author, "Zoë Ångström");
    assert_eq!(result[0].message, "Añadir ñ");
}

#[test]
fn test_parse_log_preserves_order() {
    let output = "c|A|2024-01-03|third\nb|A|2024-01-02|second\na|A|2024-01-01|first";
    let hashes: Vec<String> = parse_log(output).unwrap().into_iter().map(|c| c.hash).collect();
    assert_eq!(hashes, vec!["c", "b", "a"]);
}

/// Test parsing branch names with special characters
#[test]
fn test_parse_branches_special_chars() {
    let output = "* feature/FOO-123\n  bugfix/issue-456\n  release/v1.0.0";
    let result = parse_branch_list(output);

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].name, "feature/FOO-123");
    assert!(result[0].is_current);
    assert_eq!(result[2].name, "release/v1.0.0");
}

#[test]
fn test_parse_branch_detached_head() {
    let result = parse_branch_list("* (HEAD detached at abc1234)\n  main");
    assert_eq!(result[0].name, "(HEAD detached at abc1234)");
    assert!(result[0].is_current);
    assert!(!result[1].is_current);
}

#[test]
fn test_parse_branches_without_current() {
    let result = parse_branch_list("  main\n  dev");
    assert!(result.iter().all(|b| !b.is_current));
}

#[test]
fn test_same_name_local_and_remote_both_kept() {
    let mut all = parse_branch_names("main", false, Some("main"));
    all.extend(parse_branch_names("main", true, None));
    assert_eq!(all.len(), 2);
    assert_ne!(all[0].is_remote, all[1].is_remote);
}

#[test]
fn test_parse_stash_preserves_order() {
    let output = "stash@{0}: newest\nnot a stash\nstash@{1}: middle\nstash@{2}: oldest";
    let stashes = parse_stash_list(output);
    let messages: Vec<&str> = stashes.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(messages, vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_parse_stash_requires_message() {
    assert!(parse_stash_list("stash@{0}: ").is_empty());
    assert!(parse_stash_list("stash@{0}:no-space").is_empty());
}

#[test]
fn test_parse_path_list_spaces() {
    let paths = parse_path_list("build/out.o\n\nmy file.txt\n");
    assert_eq!(paths, vec!["build/out.o", "my file.txt"]);
}

#[test]
fn test_split_args_whitespace_only() {
    assert!(split_args("   \t ").is_err());
}

#[test]
fn test_locator_file_named_like_repo_dir() {
    let temp = tempfile::TempDir::new().unwrap();
    // A worktree or submodule uses a .git file instead of a directory
    std::fs::write(temp.path().join(".git"), "gitdir: elsewhere").unwrap();
    assert!(RepositoryLocator::is_root(temp.path()));
}
