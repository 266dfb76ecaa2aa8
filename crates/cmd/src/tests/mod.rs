// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::commands::{self, PutSource};
use crate::common::{bridge_for, get_config_path_with_override, open_bridge};
use blobfs::{AccountConfig, BackendConfig, FileSystemBridge, ListingConfig, StorageConfig};
use std::path::Path;

const C1: &str = "/acct/Blob Containers/c1";
const S1: &str = "/acct/File Shares/s1";

/// Local blob and share roots under a temporary directory
fn setup_local(dir: &Path) -> StorageConfig {
    std::fs::create_dir_all(dir.join("blobs").join("c1")).unwrap();
    std::fs::create_dir_all(dir.join("shares").join("s1")).unwrap();
    StorageConfig {
        accounts: vec![AccountConfig {
            name: "acct".to_string(),
            blob: Some(BackendConfig::Local {
                path: dir.join("blobs"),
            }),
            share: Some(BackendConfig::Local {
                path: dir.join("shares"),
            }),
        }],
        listing: ListingConfig::default(),
    }
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

async fn ls(bridge: &FileSystemBridge, path: &str) -> String {
    let mut buf = Vec::new();
    commands::ls_command(bridge, path, &mut buf).await.unwrap();
    output(buf)
}

#[tokio::test]
async fn test_put_cat_ls_on_local_blobs() {
    let tmp = tempfile::tempdir().unwrap();
    let bridge = bridge_for(setup_local(tmp.path()));

    commands::mkdir_command(&bridge, &format!("{C1}/reports")).await.unwrap();
    assert_eq!(ls(&bridge, C1).await, "reports/\n");

    commands::put_command(
        &bridge,
        &format!("{C1}/reports/q1.csv"),
        PutSource::Content("a,b\n1,2\n".to_string()),
        false,
    )
    .await
    .unwrap();
    assert!(tmp.path().join("blobs/c1/reports/q1.csv").is_file());

    let mut buf = Vec::new();
    commands::cat_command(&bridge, &format!("{C1}/reports/q1.csv"), &mut buf)
        .await
        .unwrap();
    assert_eq!(output(buf), "a,b\n1,2\n");

    let mut buf = Vec::new();
    commands::stat_command(&bridge, &format!("{C1}/reports"), &mut buf)
        .await
        .unwrap();
    assert_eq!(output(buf), format!("{C1}/reports: directory\n"));

    // Existing file needs --overwrite.
    let again = commands::put_command(
        &bridge,
        &format!("{C1}/reports/q1.csv"),
        PutSource::Content("x".to_string()),
        false,
    )
    .await;
    assert!(again.is_err());
}

#[tokio::test]
async fn test_put_from_host_file_and_rm() {
    let tmp = tempfile::tempdir().unwrap();
    let bridge = bridge_for(setup_local(tmp.path()));
    let source = tmp.path().join("upload.txt");
    std::fs::write(&source, "uploaded").unwrap();

    commands::mkdir_command(&bridge, &format!("{S1}/inbox")).await.unwrap();
    commands::put_command(
        &bridge,
        &format!("{S1}/inbox/upload.txt"),
        PutSource::HostFile(source),
        false,
    )
    .await
    .unwrap();
    assert_eq!(ls(&bridge, &format!("{S1}/inbox")).await, "upload.txt\n");

    assert!(
        commands::rm_command(&bridge, &format!("{S1}/inbox"), false, &mut Vec::new())
            .await
            .is_err()
    );

    let mut buf = Vec::new();
    commands::rm_command(&bridge, &format!("{S1}/inbox"), true, &mut buf)
        .await
        .unwrap();
    let printed = output(buf);
    assert!(printed.contains(&format!("removed {S1}/inbox/upload.txt")));
    assert!(printed.contains(&format!("removed {S1}/inbox\n")));
    assert!(!tmp.path().join("shares/s1/inbox").exists());
}

#[tokio::test]
async fn test_mv_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let bridge = bridge_for(setup_local(tmp.path()));
    let err = commands::mv_command(&bridge, &format!("{C1}/a"), &format!("{C1}/b"), false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not supported"));
}

#[test]
fn test_config_override() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("storage.yaml");
    std::fs::write(
        &file,
        "accounts:\n  - name: acct\n    blob:\n      type: memory\n",
    )
    .unwrap();

    assert_eq!(
        get_config_path_with_override(Some(file.clone())).unwrap(),
        file
    );
    assert!(open_bridge(Some(file)).is_ok());
    assert!(open_bridge(Some(tmp.path().join("missing.yaml"))).is_err());
}

#[tokio::test]
async fn test_rm_recursive_on_local_blobs() {
    let tmp = tempfile::tempdir().unwrap();
    let bridge = bridge_for(setup_local(tmp.path()));

    commands::mkdir_command(&bridge, &format!("{C1}/d")).await.unwrap();
    commands::mkdir_command(&bridge, &format!("{C1}/d/e")).await.unwrap();
    commands::put_command(
        &bridge,
        &format!("{C1}/d/e/f.txt"),
        PutSource::Content("f".to_string()),
        false,
    )
    .await
    .unwrap();
    assert!(tmp.path().join("blobs/c1/d/e/f.txt").is_file());

    let mut buf = Vec::new();
    commands::rm_command(&bridge, &format!("{C1}/d"), true, &mut buf)
        .await
        .unwrap();
    assert!(output(buf).contains(&format!("removed {C1}/d/e/f.txt")));

    // No empty host directories left behind to list as prefixes.
    assert_eq!(ls(&bridge, C1).await, "");
    assert!(!tmp.path().join("blobs/c1/d").exists());
    assert!(tmp.path().join("blobs/c1").is_dir());
    assert!(
        commands::stat_command(&bridge, &format!("{C1}/d"), &mut Vec::new())
            .await
            .is_err()
    );
    commands::mkdir_command(&bridge, &format!("{C1}/d")).await.unwrap();
}
