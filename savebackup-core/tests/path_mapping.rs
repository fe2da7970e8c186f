use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use rstest::rstest;

use savebackup_core::{MapError, PathMapper};

const TS: &str = "2024-01-02_03-04-05";

// ---------------------------------------------------------------------------
// Unix-style sources (colon-free roots, no extra separator)
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[rstest]
#[case("/home/u/proj/a.txt", "/home/u/.SaveBackup/home/u/proj/a-2024-01-02_03-04-05.txt")]
#[case("/home/u/proj/main.rs", "/home/u/.SaveBackup/home/u/proj/main-2024-01-02_03-04-05.rs")]
#[case("/home/u/proj/README", "/home/u/.SaveBackup/home/u/proj/README-2024-01-02_03-04-05")]
#[case("/home/u/proj:v2/a.txt", "/home/u/.SaveBackup/home/u/projv2/a-2024-01-02_03-04-05.txt")]
#[case("/home/u/a:b:c.txt", "/home/u/.SaveBackup/home/u/abc-2024-01-02_03-04-05.txt")]
fn unix_sources_mirror_under_root(#[case] source: &str, #[case] expected: &str) {
    let mapper = PathMapper::new("/home/u/.SaveBackup", false);
    let dest = mapper.derive(Path::new(source), TS).expect("derive");
    assert_eq!(dest, PathBuf::from(expected));
}

// ---------------------------------------------------------------------------
// Drive-letter sources (extra separator after root)
// ---------------------------------------------------------------------------

#[rstest]
#[case("C:/Users/u/proj/a.txt", "C/Users/u/proj/a-2024-01-02_03-04-05.txt")]
#[case("d:/notes/todo.md", "d/notes/todo-2024-01-02_03-04-05.md")]
fn drive_letter_colon_is_stripped(#[case] source: &str, #[case] mirrored: &str) {
    let mapper = PathMapper::new("/backup", true);
    let dest = mapper.derive(Path::new(source), TS).expect("derive");

    let expected = format!("/backup{MAIN_SEPARATOR}{mirrored}");
    assert_eq!(dest, PathBuf::from(expected));
    let mirrored_part = dest
        .to_str()
        .expect("utf8")
        .trim_start_matches("/backup");
    assert!(!mirrored_part.contains(':'), "colon survived in {dest:?}");
}

#[rstest]
#[case("C:/x/a.txt", "C/x/a-2024-01-02_03-04-05.txt")]
#[case(r"e:\docs\plan.md", r"e\docs\plan-2024-01-02_03-04-05.md")]
fn drive_paths_stay_inside_root_without_extra_separator(
    #[case] source: &str,
    #[case] mirrored: &str,
) {
    let mapper = PathMapper::new("/home/u/.SaveBackup", false);
    let dest = mapper.derive(Path::new(source), TS).expect("derive");

    let expected = format!("/home/u/.SaveBackup{MAIN_SEPARATOR}{mirrored}");
    assert_eq!(dest, PathBuf::from(expected));
    assert!(mapper.is_backup_path(&dest), "{dest:?} escaped the backup root");
}

#[test]
fn backslash_drive_paths_splice_at_the_file_name() {
    let mapper = PathMapper::new("/backup", true);
    let dest = mapper
        .derive(Path::new(r"C:\work\v1.0\notes"), TS)
        .expect("derive");
    let expected = format!(r"/backup{MAIN_SEPARATOR}C\work\v1.0\notes-{TS}");
    assert_eq!(dest, PathBuf::from(expected));
}

// ---------------------------------------------------------------------------
// Error cases
// ---------------------------------------------------------------------------

#[rstest]
#[case("")]
#[case("a.txt")]
#[case("proj/a.txt")]
#[case("./a.txt")]
fn non_absolute_sources_are_rejected(#[case] source: &str) {
    let mapper = PathMapper::new("/backup", false);
    let err = mapper.derive(Path::new(source), TS).expect_err("should fail");
    let MapError::InvalidPath { path, .. } = err;
    assert_eq!(path, PathBuf::from(source));
}

#[cfg(unix)]
#[test]
fn derivation_is_deterministic() {
    let mapper = PathMapper::new("/b", false);
    let first = mapper.derive(Path::new("/w/a.txt"), TS).expect("derive");
    let second = mapper.derive(Path::new("/w/a.txt"), TS).expect("derive");
    assert_eq!(first, second, "same second, same source → same destination");
}
