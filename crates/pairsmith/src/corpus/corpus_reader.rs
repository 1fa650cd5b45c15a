//! # Corpus Reader

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use crate::{
    corpus::find_chunk_boundaries,
    errors::{PSResult, PairsmithError},
};

/// Read the bytes ``[start, end)`` of a corpus file.
///
/// Each call opens its own read-only handle; callers on different threads
/// never share a file position.
pub fn read_corpus_range(
    path: &Path,
    start: u64,
    end: u64,
) -> io::Result<Vec<u8>> {
    let len = end.checked_sub(start).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid corpus range: [{start}, {end})"),
        )
    })?;

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;

    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// An opened corpus file, used for boundary discovery.
#[derive(Debug)]
pub struct CorpusFile {
    path: PathBuf,
    file: File,
    len: u64,
}

impl CorpusFile {
    /// Open a corpus file.
    ///
    /// ## Errors
    /// [`PairsmithError::CorpusOpen`] if the file cannot be opened or measured.
    pub fn open<P: AsRef<Path>>(path: P) -> PSResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_error = |source| PairsmithError::CorpusOpen {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_error)?;
        let len = file.metadata().map_err(open_error)?.len();

        Ok(Self { path, file, len })
    }

    /// The corpus path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The corpus length, in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Is the corpus empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find chunk boundaries; see [`find_chunk_boundaries`].
    pub fn chunk_boundaries<D: AsRef<[u8]>>(
        &mut self,
        desired_chunks: usize,
        delimiters: &[D],
    ) -> PSResult<Vec<u64>> {
        Ok(find_chunk_boundaries(
            &mut self.file,
            self.len,
            desired_chunks,
            delimiters,
        )?)
    }
}
