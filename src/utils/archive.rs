//! In-memory zip construction for multi-variable downloads.

use std::io::{Cursor, Write};

use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a deflated zip archive in memory.
///
/// Entries are written in the order given, each under its `name`.
///
/// # Errors
///
/// Returns a zip error if an entry cannot be written, e.g. a duplicate name.
pub fn build_zip<'a, I>(entries: I) -> ZipResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
