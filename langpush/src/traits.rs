//! Traits for format-agnostic parsing and serialization in langpush.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// A trait for parsing and writing one translation file.
///
/// Every format module implements this for its `Format` type, so an exported
/// file can always be read back with the paired parser.
///
/// # Example
///
/// ```rust,no_run
/// use langpush::traits::Parser;
/// let format = langpush::formats::strings::Format::read_from("fr.strings")?;
/// format.write_to("fr_copy.strings")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize into an in-memory buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        Ok(out)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{formats::gettext, types::TranslationDocument};

    #[test]
    fn test_write_to_then_read_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("de.po");
        let document = TranslationDocument::from_pairs("de", [("menu.open", "Öffnen")]);

        gettext::Format::from(document.clone()).write_to(&path).unwrap();
        let parsed = gettext::Format::read_from(&path).unwrap();

        assert_eq!(TranslationDocument::from(parsed), document);
    }

    #[test]
    fn test_read_from_missing_file_is_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = gettext::Format::read_from(temp_dir.path().join("missing.po"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
