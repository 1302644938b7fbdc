use pacozip::{Archive, ArchiveError, CompressionStrategy, EntryKind};
use std::io::Cursor;

fn empty_archive() -> Archive<Cursor<Vec<u8>>> {
    Archive::create(Cursor::new(Vec::new())).unwrap()
}

fn add_text(archive: &mut Archive<Cursor<Vec<u8>>>, name: &str, text: &str, strategy: CompressionStrategy) {
    let mut input = Cursor::new(text.as_bytes().to_vec());
    archive.add_file(name, &mut input, strategy).unwrap();
}

fn read_text(archive: &mut Archive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut out = Vec::new();
    archive.read_file(name, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// S1 — basic store/retrieve, across every LZW dictionary width.
#[test]
fn s1_basic_store_retrieve_every_lzw_param() {
    for param in 0u8..10 {
        let strategy = CompressionStrategy::Lzw { param };
        let mut archive = empty_archive();

        add_text(&mut archive, "file1.txt", "TestTest1", strategy);
        add_text(&mut archive, "file2.txt", "TestTest2", strategy);
        add_text(&mut archive, "file3.txt", "TestTest3", strategy);
        archive.add_folder("folder1").unwrap();

        assert!(archive.verify().unwrap(), "param={param}");
        assert_eq!(archive.iterate().unwrap().len(), 4, "param={param}");
        assert_eq!(read_text(&mut archive, "file1.txt"), "TestTest1");
        assert_eq!(
            archive.get_file_type("folder1").unwrap(),
            EntryKind::Folder
        );

        archive.delete_file("file2.txt").unwrap();
        archive.delete_file("folder1").unwrap();
        assert_eq!(archive.iterate().unwrap().len(), 2, "param={param}");
        assert_eq!(read_text(&mut archive, "file1.txt"), "TestTest1");
        assert_eq!(read_text(&mut archive, "file3.txt"), "TestTest3");

        add_text(&mut archive, "file4.txt", "ASDSAasd4", strategy);
        assert_eq!(archive.iterate().unwrap().len(), 3, "param={param}");
        assert!(archive.verify().unwrap(), "param={param}");
    }
}

/// S2 — an incompressible payload falls back to NONE even when LZW was
/// requested, and still round-trips byte-for-byte.
#[test]
fn s2_incompressible_payload_falls_back_to_none() {
    let mut archive = empty_archive();
    // Not "cryptographically random", but varied enough that no 16-byte
    // window of it repeats under any of the fixed LZW widths.
    let blob: Vec<u8> = (0..16u32).map(|i| (i * 137 + 7) as u8).collect();

    let mut input = Cursor::new(blob.clone());
    archive
        .add_file("blob.bin", &mut input, CompressionStrategy::Lzw { param: 5 })
        .unwrap();

    let info = archive.find("blob.bin").unwrap().unwrap();
    assert_eq!(info.codec_id, 0);
    assert_eq!(info.payload_size, 16);

    let mut out = Vec::new();
    archive.read_file("blob.bin", &mut out).unwrap();
    assert_eq!(out, blob);
}

/// S3 — deleting a middle entry opens a hole the allocator reuses for a
/// later, smaller entry: the container does not grow to fit it.
#[test]
fn s3_hole_reuse_after_delete() {
    let mut archive = empty_archive();
    let payload = vec![0x42u8; 1024];

    for name in ["a", "b", "c"] {
        let mut input = Cursor::new(payload.clone());
        archive
            .add_file(name, &mut input, CompressionStrategy::None)
            .unwrap();
    }
    let len_with_three = archive.len().unwrap();

    archive.delete_file("b").unwrap();

    let small = vec![0x7u8; 64];
    let mut input = Cursor::new(small.clone());
    archive.add_file("b2", &mut input, CompressionStrategy::None).unwrap();

    // b2 (29 + 2 + 64 bytes) fits inside the hole vacated by b (29 + 1 +
    // 1024 bytes), so the container must not have grown.
    assert_eq!(archive.len().unwrap(), len_with_three);
    assert_eq!(read_text_bytes(&mut archive, "b2"), small);
    assert_eq!(read_text_bytes(&mut archive, "a"), payload);
    assert_eq!(read_text_bytes(&mut archive, "c"), payload);
}

fn read_text_bytes(archive: &mut Archive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    archive.read_file(name, &mut out).unwrap();
    out
}

/// S4 — flipping a byte inside a payload is caught by `verify()` and by
/// `verify_entry()` for the affected entry, without touching other entries.
#[test]
fn s4_corruption_detection() {
    let mut archive = empty_archive();
    add_text(&mut archive, "a.txt", "TestTest1", CompressionStrategy::None);
    add_text(&mut archive, "b.txt", "TestTest2", CompressionStrategy::None);
    assert!(archive.verify().unwrap());

    // NONE-compressed payloads appear verbatim in the container, so the
    // bytes of "a.txt"'s payload can be located and flipped without any
    // knowledge of the header layout.
    let mut raw = archive.into_inner().into_inner();
    let pos = raw
        .windows(b"TestTest1".len())
        .position(|w| w == b"TestTest1")
        .expect("payload bytes not found in container");
    raw[pos] ^= 0xFF;

    let mut archive = Archive::open(Cursor::new(raw)).unwrap();
    assert!(!archive.verify().unwrap());
    assert!(!archive.verify_entry("a.txt").unwrap());
    assert!(archive.verify_entry("b.txt").unwrap());
}

/// S5 — adding the same name twice is rejected.
#[test]
fn s5_duplicate_name_rejected() {
    let mut archive = empty_archive();
    add_text(&mut archive, "f", "one", CompressionStrategy::None);

    let mut input = Cursor::new(b"two".to_vec());
    let err = archive
        .add_file("f", &mut input, CompressionStrategy::None)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::DuplicateName(name) if name == "f"));
}

/// S6 — opening a container with the wrong magic fails cleanly.
#[test]
fn s6_bad_magic_rejected() {
    let mut bytes = vec![0u8; 20];
    bytes[0..8].copy_from_slice(b"NOTAZIPP");
    let err = Archive::open(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, ArchiveError::BadMagic));
}

/// Invariant 1: iteration order matches insertion order among survivors.
#[test]
fn iteration_order_matches_insertion_among_survivors() {
    let mut archive = empty_archive();
    for name in ["x", "y", "z", "w"] {
        add_text(&mut archive, name, name, CompressionStrategy::None);
    }
    archive.delete_file("y").unwrap();
    let names: Vec<String> = archive.iterate().unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(names, vec!["x", "z", "w"]);
}

/// Invariant 3: occupied ranges never overlap, even after repeated
/// delete/reuse cycles.
#[test]
fn ranges_stay_disjoint_after_churn() {
    let mut archive = empty_archive();
    for round in 0..5 {
        for i in 0..4 {
            let name = format!("r{round}-{i}");
            let mut input = Cursor::new(vec![round as u8; 100 + i * 17]);
            archive.add_file(&name, &mut input, CompressionStrategy::None).unwrap();
        }
        archive.delete_file(&format!("r{round}-1")).unwrap();
        assert!(archive.verify().unwrap());
    }
}

/// Invariant 7: verify() is true immediately after any successful mutation.
#[test]
fn verify_is_idempotent_after_mutation() {
    let mut archive = empty_archive();
    add_text(&mut archive, "one", "abc", CompressionStrategy::Lzw { param: 2 });
    assert!(archive.verify().unwrap());
    add_text(&mut archive, "two", "def", CompressionStrategy::Lzw { param: 2 });
    assert!(archive.verify().unwrap());
    archive.delete_file("one").unwrap();
    assert!(archive.verify().unwrap());
}

/// Round trip with a folder entry: folders carry no payload and are not
/// readable as files.
#[test]
fn folder_entries_reject_read_file() {
    let mut archive = empty_archive();
    archive.add_folder("docs").unwrap();
    let mut out = Vec::new();
    let err = archive.read_file("docs", &mut out).unwrap_err();
    assert!(matches!(err, ArchiveError::WrongKind(_)));
}

/// Reopening a populated archive from its raw bytes preserves every entry.
#[test]
fn reopen_preserves_entries() {
    let mut archive = empty_archive();
    add_text(&mut archive, "one", "first file", CompressionStrategy::Lzw { param: 1 });
    add_text(&mut archive, "two", "second file", CompressionStrategy::None);

    let raw = archive.into_inner().into_inner();
    let mut reopened = Archive::open(Cursor::new(raw)).unwrap();

    assert!(reopened.verify().unwrap());
    assert_eq!(read_text(&mut reopened, "one"), "first file");
    assert_eq!(read_text(&mut reopened, "two"), "second file");
}
