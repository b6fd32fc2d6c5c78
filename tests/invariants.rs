//! Structural invariants of the on-disk state, checked over the raw image
//! after arbitrary operation sequences.

use oufs::block::{
    BLOCK_SIZE, BlockReference, FileKind, InodeReference, MASTER_BLOCK_REFERENCE, MAX_FILE_SIZE,
    N_BLOCKS_IN_DISK, N_INODE_BLOCKS, N_INODES, UNALLOCATED_BLOCK,
};
use oufs::file::{self, OpenMode};
use oufs::format::format;
use oufs::inode::read_inode;
use oufs::vdisk::VDisk;
use oufs::dir;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tempfile::TempDir;

fn fresh() -> (TempDir, VDisk) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("vdisk1");
    format(&path).unwrap();
    (tmp, VDisk::open(path).unwrap())
}

/// Checks every structural invariant of the image:
/// bitmap coherence, directory well-formedness, file block accounting,
/// name uniqueness and reference counts.
fn check_invariants(disk: &mut VDisk) {
    let master_block = disk.read_block(MASTER_BLOCK_REFERENCE).unwrap();
    let master = master_block.master();

    // Data blocks claimed by inodes, with their owner
    let mut claimed: HashMap<BlockReference, InodeReference> = HashMap::new();
    // Number of active directory entries pointing at each inode
    let mut entry_refs: HashMap<InodeReference, usize> = HashMap::new();

    for i in 0..N_INODES as InodeReference {
        let inode = read_inode(disk, i).unwrap();
        if !master.inode_is_allocated(i) {
            assert_eq!(inode.kind, FileKind::None, "freed inode {i} must be cleared");
            continue;
        }
        let mut claim = |r: BlockReference| {
            assert!(
                claimed.insert(r, i).is_none(),
                "block {r} is claimed by two inodes"
            );
        };
        match inode.kind {
            FileKind::Directory => {
                let b = inode.data[0];
                assert_ne!(b, UNALLOCATED_BLOCK, "directory {i} without a block");
                claim(b);
                for r in &inode.data[1..] {
                    assert_eq!(*r, UNALLOCATED_BLOCK, "directory {i} spans two blocks");
                }

                let block = disk.read_block(b).unwrap();
                let d = block.directory();
                assert_eq!(d.entry[0].name_bytes(), b".");
                assert_eq!(d.entry[0].inode_reference, i);
                assert_eq!(d.entry[1].name_bytes(), b"..");
                assert!(master.inode_is_allocated(d.entry[1].inode_reference));

                let mut names = HashSet::new();
                let mut active = 0;
                for e in &d.entry {
                    if !e.is_allocated() {
                        continue;
                    }
                    active += 1;
                    assert!(
                        names.insert(e.name_bytes().to_vec()),
                        "duplicate name in directory {i}"
                    );
                    assert!(
                        master.inode_is_allocated(e.inode_reference),
                        "entry in directory {i} points at a free inode"
                    );
                    *entry_refs.entry(e.inode_reference).or_default() += 1;
                }
                assert_eq!(inode.size as usize, active, "directory {i} miscounts");
            }
            FileKind::File => {
                let blocks = (inode.size as usize).div_ceil(BLOCK_SIZE);
                for (k, r) in inode.data.iter().enumerate() {
                    if k < blocks {
                        assert_ne!(*r, UNALLOCATED_BLOCK, "file {i} is missing block {k}");
                        claim(*r);
                    } else {
                        assert_eq!(*r, UNALLOCATED_BLOCK, "file {i} leaks block {k}");
                    }
                }
            }
            FileKind::None => panic!("allocated inode {i} has no kind"),
        }
    }

    // Invariant 1: a block bit is set iff the block is reserved or claimed
    for r in 0..N_BLOCKS_IN_DISK as BlockReference {
        let expected = r as usize <= N_INODE_BLOCKS || claimed.contains_key(&r);
        assert_eq!(
            master.block_is_allocated(r),
            expected,
            "block {r} bitmap mismatch"
        );
    }
    // No orphans, and file link counts match the live entries
    for i in 0..N_INODES as InodeReference {
        if !master.inode_is_allocated(i) {
            continue;
        }
        let refs = entry_refs.get(&i).copied().unwrap_or(0);
        assert!(refs > 0, "allocated inode {i} is orphaned");
        let inode = read_inode(disk, i).unwrap();
        if inode.kind == FileKind::File {
            assert_eq!(inode.n_references as usize, refs, "inode {i} link count");
        }
    }
}

fn create(disk: &mut VDisk, path: &str, content: &[u8]) -> usize {
    let mut file = file::open(disk, "/", path, OpenMode::Write).unwrap();
    let n = file::write(disk, &mut file, content).unwrap();
    file.close();
    n
}

fn read_all(disk: &mut VDisk, path: &str) -> Vec<u8> {
    let mut file = file::open(disk, "/", path, OpenMode::Read).unwrap();
    let mut buf = vec![0; MAX_FILE_SIZE + 1];
    let n = file::read(disk, &mut file, &mut buf).unwrap();
    file.close();
    buf.truncate(n);
    buf
}

#[test]
fn invariants_hold_across_a_scripted_sequence() {
    let (_tmp, mut disk) = fresh();
    check_invariants(&mut disk);

    dir::mkdir(&mut disk, "/", "/a").unwrap();
    dir::mkdir(&mut disk, "/", "/a/b").unwrap();
    dir::touch(&mut disk, "/", "/a/f").unwrap();
    check_invariants(&mut disk);

    create(&mut disk, "/a/f", &[3; 600]);
    dir::link(&mut disk, "/", "/a/f", "/g").unwrap();
    check_invariants(&mut disk);

    dir::remove(&mut disk, "/", "/a/f").unwrap();
    check_invariants(&mut disk);
    dir::remove(&mut disk, "/", "/g").unwrap();
    dir::rmdir(&mut disk, "/", "/a/b").unwrap();
    dir::rmdir(&mut disk, "/", "/a").unwrap();
    check_invariants(&mut disk);
}

// Property 5: any payload within capacity survives a round trip unchanged
#[test]
fn random_payload_round_trips() {
    let (_tmp, mut disk) = fresh();
    let mut rng = StdRng::seed_from_u64(0x0f5);

    let mut lengths = vec![0, 1, 255, 256, 257, 511, 2047, MAX_FILE_SIZE];
    for _ in 0..8 {
        lengths.push(rng.gen_range(2..MAX_FILE_SIZE));
    }
    for len in lengths {
        let mut payload = vec![0; len];
        rng.fill(payload.as_mut_slice());
        assert_eq!(create(&mut disk, "/f", &payload), len);
        assert_eq!(read_all(&mut disk, "/f"), payload, "length {len}");
        check_invariants(&mut disk);
    }
}

// Property 6: mkdir then rmdir leaves the bitmaps bit-for-bit unchanged
#[test]
fn mkdir_rmdir_is_bitmap_idempotent() {
    let (_tmp, mut disk) = fresh();
    dir::mkdir(&mut disk, "/", "/keep").unwrap();
    let before = disk
        .read_block(MASTER_BLOCK_REFERENCE)
        .unwrap()
        .bytes()
        .to_vec();

    dir::mkdir(&mut disk, "/", "/p").unwrap();
    dir::rmdir(&mut disk, "/", "/p").unwrap();

    let after = disk
        .read_block(MASTER_BLOCK_REFERENCE)
        .unwrap()
        .bytes()
        .to_vec();
    assert_eq!(before, after);
}

// Property 7: listings come out in non-decreasing byte order
#[test]
fn listing_is_sorted() {
    let (_tmp, mut disk) = fresh();
    for name in ["zz", "m", "aa", "k0", "k"] {
        dir::mkdir(&mut disk, "/", name).unwrap();
    }
    dir::touch(&mut disk, "/", "n").unwrap();
    let names = dir::list(&mut disk, "/", "/").unwrap();
    let bare: Vec<&str> = names.iter().map(|n| n.trim_end_matches('/')).collect();
    assert!(bare.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(
        names,
        vec!["./", "../", "aa/", "k/", "k0/", "m/", "n", "zz/"]
    );
}

#[test]
fn invariants_hold_under_random_operations() {
    let (_tmp, mut disk) = fresh();
    let mut rng = StdRng::seed_from_u64(0x00d1);

    let dirs = ["/a", "/b", "/a/c", "/a/c/d"];
    let files = ["/f", "/g", "/a/h", "/a/c/k", "/l0", "/l1"];
    for step in 0..400 {
        match rng.gen_range(0..7) {
            0 => {
                let _ = dir::mkdir(&mut disk, "/", dirs[rng.gen_range(0..dirs.len())]);
            }
            1 => {
                let _ = dir::rmdir(&mut disk, "/", dirs[rng.gen_range(0..dirs.len())]);
            }
            2 => {
                let _ = dir::touch(&mut disk, "/", files[rng.gen_range(0..files.len())]);
            }
            3 => {
                let _ = dir::remove(&mut disk, "/", files[rng.gen_range(0..files.len())]);
            }
            4 => {
                let src = files[rng.gen_range(0..files.len())];
                let dst = files[rng.gen_range(0..files.len())];
                let _ = dir::link(&mut disk, "/", src, dst);
            }
            5 => {
                let path = files[rng.gen_range(0..files.len())];
                let mode = if rng.gen_bool(0.5) {
                    OpenMode::Write
                } else {
                    OpenMode::Append
                };
                if let Ok(mut file) = file::open(&mut disk, "/", path, mode) {
                    let mut payload = vec![0; rng.gen_range(0..700)];
                    rng.fill(payload.as_mut_slice());
                    file::write(&mut disk, &mut file, &payload).unwrap();
                    file.close();
                }
            }
            _ => {
                let path = files[rng.gen_range(0..files.len())];
                if let Ok(mut file) = file::open(&mut disk, "/", path, OpenMode::Read) {
                    let mut buf = [0; 333];
                    file::read(&mut disk, &mut file, &mut buf).unwrap();
                    file.close();
                }
            }
        }
        if step % 10 == 0 {
            check_invariants(&mut disk);
        }
    }
    check_invariants(&mut disk);
}
