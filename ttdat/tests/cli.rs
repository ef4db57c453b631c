#[path = "../../ttdat-format/tests/common/mod.rs"]
mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{assets_archive, fpk, lz2k_abba, tree, write_archive, DatBuilder};

fn ttdat(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ttdat"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).replace('\r', "")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).replace('\r', "")
}

#[test]
fn extracts_next_to_the_working_directory() {
    let (dir, _) = write_archive("GAME.DAT", &assets_archive().build());
    let output = ttdat(dir.path(), &["GAME.DAT"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("DAT file with signature: -1\n"));
    assert!(out.contains("Number of files: 2\n"));
    assert!(out.contains("Number of CRCs: 0\n"));
    assert!(out.contains("Offset  \tPacked  \tUnpacked\tAlg?\tFile\n"));
    assert!(out.contains(&"-".repeat(100)));
    assert!(out.contains("11      \t11      \t----\t"));
    assert!(out.contains("Extracted 2 files"));

    assert_eq!(
        tree(&dir.path().join("GAME")),
        vec![
            ("ASSETS/a.txt".to_string(), b"hello from a.txt\n".to_vec()),
            ("ASSETS/b.bin".to_string(), b"\x00\x01\x02\x03binary".to_vec()),
        ]
    );
}

#[test]
fn size_mismatch_exits_one_without_output() {
    let bytes = assets_archive().with_size_delta(1).build();
    let (dir, _) = write_archive("GAME.DAT", &bytes);
    let output = ttdat(dir.path(), &["GAME.DAT"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: "), "stderr: {}", err);
    assert!(err.contains("file size mismatch"), "stderr: {}", err);
    assert_eq!(err.trim_end().lines().count(), 1, "stderr: {}", err);
    assert!(!dir.path().join("GAME").exists());
}

#[test]
fn missing_archive_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = ttdat(dir.path(), &["NOPE.DAT"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot open archive"));
}

#[test]
fn directory_option_overrides_the_output() {
    let (dir, _) = write_archive("GAME.DAT", &assets_archive().build());
    let output = ttdat(dir.path(), &["GAME.DAT", "-d", "out"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(dir.path().join("out").join("ASSETS").join("a.txt").is_file());
    assert!(!dir.path().join("GAME").exists());
}

#[test]
fn raw_flag_keeps_packed_bytes() {
    let mut dat = DatBuilder::new(-3);
    let chunk = lz2k_abba();
    let index = dat.add_packed(&chunk, 4, 2);
    dat.dir("");
    dat.file("abba.txt", index);
    let (dir, _) = write_archive("PACK.DAT", &dat.build());

    let output = ttdat(dir.path(), &["PACK.DAT"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("\tLZ2K\t"));
    assert_eq!(tree(&dir.path().join("PACK"))[0].1, b"ABBA");

    let output = ttdat(dir.path(), &["PACK.DAT", "-r", "-d", "raw"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(tree(&dir.path().join("raw"))[0].1, chunk);
}

#[test]
fn unpacks_a_single_file() {
    let (dir, _) = write_archive("blob.bin", &lz2k_abba());

    let output = ttdat(dir.path(), &["blob.bin", "-u", "-s", "4"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(std::fs::read(dir.path().join("blob.bin.dec")).unwrap(), b"ABBA");

    let output = ttdat(dir.path(), &["blob.bin", "-u", "-a", "lz2k", "-o", "out.txt"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(std::fs::read(dir.path().join("out.txt")).unwrap(), b"ABBA");

    let output = ttdat(dir.path(), &["blob.bin", "-u", "-s", "0x8"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("size mismatch"));
}

#[test]
fn unpack_options_need_unpack_mode() {
    let (dir, _) = write_archive("GAME.DAT", &assets_archive().build());
    let output = ttdat(dir.path(), &["GAME.DAT", "-s", "4"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("GAME").exists());
}

#[test]
fn verbose_logs_to_stderr() {
    let (dir, _) = write_archive("GAME.DAT", &assets_archive().build());
    let output = ttdat(dir.path(), &["GAME.DAT", "-v"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("resolved DAT entries"));
    assert!(dir.path().join("GAME").join("ASSETS").join("b.bin").is_file());
}

#[test]
fn extracts_every_fpk_entry() {
    let bytes = fpk(&[("one.bin", b"1"), ("two.bin", b"22"), ("three.bin", b"333")]);
    let (dir, _) = write_archive("PACK.FPK", &bytes);
    let output = ttdat(dir.path(), &["PACK.FPK"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        tree(&dir.path().join("PACK")),
        vec![
            ("one.bin".to_string(), b"1".to_vec()),
            ("three.bin".to_string(), b"333".to_vec()),
            ("two.bin".to_string(), b"22".to_vec()),
        ]
    );
}
