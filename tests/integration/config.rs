//! Integration tests for the inittab Config Loader against real files on
//! disk (§4.3, §6).
use std::fs;

use initd::config::load_inittab;
use tempfile::tempdir;

#[test]
fn loads_the_spec_example_from_a_real_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("inittab");
    fs::write(
        &path,
        "\
# system services
3 /usr/sbin/syslogd - 0 0
3 /usr/sbin/sshd syslogd 67108864 20
",
    )
    .expect("write inittab");

    let decls = load_inittab(&path).expect("load inittab");
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0].command, "/usr/sbin/syslogd");
    assert!(decls[0].dependencies.is_empty());
    assert_eq!(decls[1].command, "/usr/sbin/sshd");
    assert_eq!(decls[1].dependencies, vec!["syslogd".to_string()]);
    assert_eq!(decls[1].memory_limit_bytes, 67_108_864);
    assert_eq!(decls[1].cpu_quota_percent, 20);
}

#[test]
fn missing_file_surfaces_an_io_error_rather_than_an_empty_list() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("does-not-exist");

    let result = load_inittab(&path);
    assert!(result.is_err());
}

#[test]
fn malformed_lines_are_skipped_but_valid_siblings_still_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("inittab");
    fs::write(
        &path,
        "\
not_a_number /bin/true - 0 0
3 relative/path - 0 0
3 /bin/true - 0 101

# a lone comment
3 /bin/false - 0 0
",
    )
    .expect("write inittab");

    let decls = load_inittab(&path).expect("load inittab");
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].command, "/bin/false");
}

#[test]
fn reload_is_a_noop_when_the_file_has_not_changed() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("inittab");
    let content = "3 /bin/a - 0 0\n3 /bin/b a 0 0\n";
    fs::write(&path, content).expect("write inittab");

    let first = load_inittab(&path).expect("first load");
    let second = load_inittab(&path).expect("second load");
    assert_eq!(first, second);
}
