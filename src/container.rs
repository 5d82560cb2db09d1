//! Tar container for directory trees.
//!
//! A packed directory keeps its own base name as the top-level entry, so
//! packing `data/` and unpacking into `out/` yields `out/data/...`.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tar::{Archive, Builder, Header};
use walkdir::WalkDir;

const BLOCK_SIZE: usize = 512;

/// Packs `dir` into a tar file at `destination`, returning the entry count.
///
/// Entries are written in file-name order, so the same tree always produces
/// the same sequence of entries. Symlinks are stored as links. When
/// `destination` lies inside `dir`, the archive being written is left out.
pub fn pack(dir: &Path, destination: &Path) -> io::Result<usize> {
    let base = base_name(dir)?;
    let mut builder = Builder::new(BufWriter::new(File::create(destination)?));
    builder.follow_symlinks(false);
    let archive_path = destination.canonicalize()?;

    let mut count = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if is_same_file(entry.path(), &archive_path) {
            log::debug!("skipping the archive itself: {}", entry.path().display());
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let name = if rel.as_os_str().is_empty() {
            PathBuf::from(&base)
        } else {
            Path::new(&base).join(rel)
        };

        log::debug!("pack {}", name.display());
        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), &name)?;
        }
        count += 1;
    }

    builder.into_inner()?.flush()?;
    Ok(count)
}

/// Unpacks the tar file at `source` under `destination`.
///
/// Parent directories are created as needed. Entries whose path would land
/// outside `destination` are skipped.
pub fn unpack(source: &Path, destination: &Path) -> io::Result<usize> {
    let mut archive = Archive::new(BufReader::new(File::open(source)?));
    let mut count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.into_owned();
        if entry.unpack_in(destination)? {
            log::debug!("unpack {}", name.display());
            count += 1;
        } else {
            log::warn!("skipped entry outside destination: {}", name.display());
        }
    }
    Ok(count)
}

/// True when the first block of `path` is a valid ustar or GNU tar header.
///
/// Only the first header is inspected. A plain file whose leading 512 bytes
/// happen to form a valid header is reported as a container.
pub fn is_container(path: &Path) -> io::Result<bool> {
    let mut block = [0u8; BLOCK_SIZE];
    match File::open(path)?.read_exact(&mut block) {
        Ok(()) => Ok(is_header_block(&block)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_header_block(block: &[u8; BLOCK_SIZE]) -> bool {
    let header = Header::from_byte_slice(block);
    if header.as_ustar().is_none() && header.as_gnu().is_none() {
        return false;
    }
    let mut expected = header.clone();
    expected.set_cksum();
    matches!((header.cksum(), expected.cksum()), (Ok(found), Ok(want)) if found == want)
}

fn is_same_file(path: &Path, canonical: &Path) -> bool {
    path.file_name() == canonical.file_name()
        && path.canonicalize().is_ok_and(|p| p == canonical)
}

fn base_name(dir: &Path) -> io::Result<OsString> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_os_string());
    }
    // `.`, `..` and `/` have no name of their own
    dir.canonicalize()?
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot derive an archive name from '{}'", dir.display()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn packed_entries_are_rooted_at_the_base_name() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(data.join("nested")).unwrap();
        fs::write(data.join("b.txt"), "b").unwrap();
        fs::write(data.join("a.txt"), "a").unwrap();
        fs::write(data.join("nested/c.txt"), "c").unwrap();

        let tar_path = dir.path().join("data.tar");
        assert_eq!(pack(&data, &tar_path).unwrap(), 5);

        let mut archive = Archive::new(File::open(&tar_path).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path().unwrap().to_string_lossy().into_owned();
                path.trim_end_matches('/').to_string()
            })
            .collect();
        assert_eq!(
            names,
            ["data", "data/a.txt", "data/b.txt", "data/nested", "data/nested/c.txt"]
        );
    }

    #[test]
    fn archive_inside_the_tree_is_not_packed() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("a.txt"), "a").unwrap();

        let tar_path = data.join("inner.tar");
        assert_eq!(pack(&data, &tar_path).unwrap(), 2);

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        unpack(&tar_path, &out).unwrap();
        assert!(out.join("data/a.txt").is_file());
        assert!(!out.join("data/inner.tar").exists());
    }

    #[test]
    fn trailing_separator_keeps_the_base_name() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        assert_eq!(base_name(Path::new(&format!("{}/", data.display()))).unwrap(), "data");
    }

    #[test]
    fn packed_file_is_sniffed_as_container() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("a.txt"), "x").unwrap();
        let tar_path = dir.path().join("data.tar");
        pack(&data, &tar_path).unwrap();
        assert!(is_container(&tar_path).unwrap());
    }

    #[test]
    fn plain_files_are_not_containers() {
        let dir = tempdir().unwrap();
        let short = dir.path().join("short.txt");
        fs::write(&short, "hello").unwrap();
        assert!(!is_container(&short).unwrap());

        let long = dir.path().join("long.bin");
        fs::write(&long, vec![b'x'; 4096]).unwrap();
        assert!(!is_container(&long).unwrap());

        let zeros = dir.path().join("zeros.bin");
        fs::write(&zeros, vec![0u8; 1024]).unwrap();
        assert!(!is_container(&zeros).unwrap());
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        let tar_path = dir.path().join("data.tar");
        pack(&data, &tar_path).unwrap();

        let mut bytes = fs::read(&tar_path).unwrap();
        bytes[0] ^= 0x20;
        fs::write(&tar_path, bytes).unwrap();
        assert!(!is_container(&tar_path).unwrap());
    }

    #[test]
    fn unpack_rebuilds_the_tree() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(data.join("deep/er")).unwrap();
        fs::write(data.join("deep/er/file.bin"), [0u8, 159, 146, 150]).unwrap();
        fs::create_dir(data.join("empty")).unwrap();

        let tar_path = dir.path().join("data.tar");
        pack(&data, &tar_path).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        unpack(&tar_path, &out).unwrap();

        assert_eq!(
            fs::read(out.join("data/deep/er/file.bin")).unwrap(),
            [0u8, 159, 146, 150]
        );
        assert!(out.join("data/empty").is_dir());
    }

    #[test]
    fn unpack_rejects_garbage() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.tar");
        fs::write(&bogus, vec![b'x'; 1024]).unwrap();
        assert!(unpack(&bogus, dir.path()).is_err());
    }
}
