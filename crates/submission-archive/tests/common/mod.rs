use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub enum Entry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
    Symlink(&'a str, &'a str),
}

pub fn zip_bytes(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for entry in entries {
        match entry {
            Entry::File(name, data) => {
                writer.start_file(*name, options).expect("start zip entry");
                writer.write_all(data).expect("write zip entry");
            }
            Entry::Dir(name) => {
                writer.add_directory(*name, options).expect("add zip directory");
            }
            Entry::Symlink(name, target) => {
                writer
                    .add_symlink(*name, *target, options)
                    .expect("add zip symlink");
            }
        }
    }

    writer.finish().expect("finish zip").into_inner()
}

pub fn write_zip(path: &Path, entries: &[Entry<'_>]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create archive parent");
    }
    fs::write(path, zip_bytes(entries)).expect("write archive");
}

const LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];

/// Overwrite the uncompressed size of the first entry in both its local and
/// central directory headers.
#[allow(dead_code)]
pub fn forge_uncompressed_size(archive: &mut [u8], size: u32) {
    assert_eq!(archive[..4], LOCAL_HEADER_SIGNATURE, "first entry starts the archive");
    archive[22..26].copy_from_slice(&size.to_le_bytes());

    let central = archive
        .windows(4)
        .position(|w| w == CENTRAL_HEADER_SIGNATURE)
        .expect("central directory header");
    archive[central + 24..central + 28].copy_from_slice(&size.to_le_bytes());
}
