use std::collections::HashSet;
use std::sync::Arc;

use sift_fs::{Staging, list_files};
use tempfile::tempdir;

#[test]
fn test_concurrent_placement_never_clobbers() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let staging = Arc::new(Staging::new(dir.path().join(".staging")).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let staging = Arc::clone(&staging);
            let out = out.clone();
            std::thread::spawn(move || {
                let temp = staging.temp_file("plate.jpg");
                std::fs::write(temp.path(), format!("content {i}")).unwrap();
                temp.place(&out, "plate.jpg").unwrap()
            })
        })
        .collect();

    let placed: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(placed.len(), 16);

    let contents: HashSet<_> = list_files(&out)
        .unwrap()
        .iter()
        .map(|p| std::fs::read_to_string(p).unwrap())
        .collect();
    assert_eq!(contents.len(), 16);
    assert!(staging.leftovers().unwrap().is_empty());
}

#[test]
fn test_failed_placement_removes_staged_file() {
    let dir = tempdir().unwrap();
    let staging = Staging::new(dir.path().join(".staging")).unwrap();

    let temp = staging.temp_file("a.jpg");
    std::fs::write(temp.path(), b"X").unwrap();

    let result = temp.place(&dir.path().join("does-not-exist"), "a.jpg");
    assert!(result.is_err());
    assert!(staging.leftovers().unwrap().is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn test_placement_across_filesystems() {
    use std::os::unix::fs::MetadataExt;

    let shm = std::path::Path::new("/dev/shm");
    let out_dir = tempdir().unwrap();
    let Ok(shm_meta) = std::fs::metadata(shm) else {
        return;
    };
    if shm_meta.dev() == std::fs::metadata(out_dir.path()).unwrap().dev() {
        return;
    }
    let Ok(staging_dir) = tempfile::tempdir_in(shm) else {
        return;
    };

    let staging = Staging::new(staging_dir.path()).unwrap();
    std::fs::write(out_dir.path().join("a.jpg"), b"old").unwrap();
    let temp = staging.temp_file("a.jpg");
    std::fs::write(temp.path(), b"new").unwrap();

    let placed = temp.place(out_dir.path(), "a.jpg").unwrap();
    assert_eq!(placed, out_dir.path().join("a-1.jpg"));
    assert_eq!(std::fs::read(&placed).unwrap(), b"new");
    assert_eq!(std::fs::read(out_dir.path().join("a.jpg")).unwrap(), b"old");
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 2);
    assert!(staging.leftovers().unwrap().is_empty());
}
