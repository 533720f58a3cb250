use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn oxixz() -> Command {
    Command::new(env!("CARGO_BIN_EXE_oxixz"))
}

fn sample() -> Vec<u8> {
    b"How vexingly quick daft zebras jump! "
        .iter()
        .cycle()
        .take(64 * 1024)
        .copied()
        .collect()
}

#[test]
fn test_compress_info_decompress() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("data.txt");
    fs::write(&input, sample()).unwrap();

    let status = oxixz()
        .args(["compress", "-l", "1", "-C", "crc64"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());
    let compressed = dir.path().join("data.txt.xz");
    assert!(compressed.exists());

    let output = oxixz().args(["info", "--json"]).arg(&compressed).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["stream_count"], 1);
    assert_eq!(json[0]["uncompressed_size"], sample().len() as u64);
    assert_eq!(json[0]["check_names"][0], "CRC64");

    fs::remove_file(&input).unwrap();
    let status = oxixz().arg("decompress").arg(&compressed).status().unwrap();
    assert!(status.success());
    assert_eq!(fs::read(&input).unwrap(), sample());

    let status = oxixz().arg("test").arg(&compressed).status().unwrap();
    assert!(status.success());
}

#[test]
fn test_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("a.bin");
    fs::write(&input, b"abc").unwrap();
    fs::write(dir.path().join("a.bin.xz"), b"existing").unwrap();

    let output = oxixz().arg("compress").arg(&input).output().unwrap();
    assert!(!output.status.success());
    assert_eq!(fs::read(dir.path().join("a.bin.xz")).unwrap(), b"existing");

    let status = oxixz().args(["compress", "--force"]).arg(&input).status().unwrap();
    assert!(status.success());
}

#[test]
fn test_info_rejects_non_xz() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.txt");
    fs::write(&path, sample()).unwrap();

    let output = oxixz().arg("info").arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error:"), "{}", stderr);
}
