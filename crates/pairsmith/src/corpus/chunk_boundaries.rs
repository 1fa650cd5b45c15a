//! # Chunk Boundary Finder

use std::io::{self, Read, Seek, SeekFrom};

use aho_corasick::{AhoCorasick, MatchKind};

/// The read window used when scanning forward for a delimiter.
pub const BOUNDARY_SCAN_WINDOW: usize = 4096;

/// Split a corpus into at most `desired_chunks` independently countable chunks.
///
/// Each uniformly spaced boundary guess is snapped to the start of the
/// earliest delimiter occurrence which ends after it (or to the end of the
/// corpus). A guess inside a delimiter moves back to that delimiter's start.
///
/// Delimiters may nest (`<a><b>` and `<b>`), but occurrences must not
/// partially overlap: no proper suffix of a delimiter may be a proper prefix
/// of a delimiter.
///
/// ## Arguments
/// * `reader` - the corpus; only positioned reads are used.
/// * `corpus_len` - the corpus length, in bytes.
/// * `desired_chunks` - the target chunk count; zero is treated as one.
/// * `delimiters` - byte strings which chunks must never cut; empty entries are ignored.
///
/// ## Returns
/// Strictly increasing offsets; the first is ``0`` and the last is
/// `corpus_len`. Chunk ``i`` is ``[b[i], b[i + 1])``. An empty corpus yields ``[0]``.
pub fn find_chunk_boundaries<R, D>(
    reader: &mut R,
    corpus_len: u64,
    desired_chunks: usize,
    delimiters: &[D],
) -> io::Result<Vec<u64>>
where
    R: Read + Seek,
    D: AsRef<[u8]>,
{
    if corpus_len == 0 {
        return Ok(vec![0]);
    }

    let desired_chunks = desired_chunks.max(1) as u64;
    let chunk_size = corpus_len / desired_chunks;

    let mut boundaries: Vec<u64> = (0..=desired_chunks).map(|i| i * chunk_size).collect();
    if let Some(last) = boundaries.last_mut() {
        *last = corpus_len;
    }

    let delimiters: Vec<&[u8]> = delimiters
        .iter()
        .map(|d| d.as_ref())
        .filter(|d| !d.is_empty())
        .collect();

    if delimiters.is_empty() {
        return Ok(vec![0, corpus_len]);
    }

    let overlap = delimiters.iter().map(|d| d.len()).max().unwrap_or(1) - 1;
    let finder = AhoCorasick::builder()
        .match_kind(MatchKind::Standard)
        .build(&delimiters)
        .map_err(io::Error::other)?;

    let mut window = vec![0u8; BOUNDARY_SCAN_WINDOW + overlap];
    let internal = boundaries.len() - 1;
    for boundary in boundaries[1..internal].iter_mut() {
        *boundary = scan_to_delimiter(
            reader,
            &finder,
            &mut window,
            overlap,
            *boundary,
            corpus_len,
        )?;
    }

    boundaries.sort_unstable();
    boundaries.dedup();

    log::debug!("chunk boundaries: {boundaries:?}");
    Ok(boundaries)
}

/// Find the start of the earliest delimiter occurrence ending after `guess`; or `corpus_len`.
///
/// Scanning starts `overlap` bytes before the guess, to see a delimiter the
/// guess lands inside. Each read covers ``BOUNDARY_SCAN_WINDOW + overlap``
/// bytes, but advances only ``BOUNDARY_SCAN_WINDOW``; so a delimiter
/// starting in the first ``BOUNDARY_SCAN_WINDOW`` bytes of a read is wholly
/// contained in it.
fn scan_to_delimiter<R: Read + Seek>(
    reader: &mut R,
    finder: &AhoCorasick,
    window: &mut [u8],
    overlap: usize,
    guess: u64,
    corpus_len: u64,
) -> io::Result<u64> {
    let mut pos = guess.saturating_sub(overlap as u64);
    while pos < corpus_len {
        let len = (corpus_len - pos).min(window.len() as u64) as usize;

        reader.seek(SeekFrom::Start(pos))?;
        reader.read_exact(&mut window[..len])?;

        // Occurrences starting in the tail may be truncated; the next read sees them whole.
        let complete = if pos + len as u64 == corpus_len {
            len
        } else {
            BOUNDARY_SCAN_WINDOW
        };

        let snapped = finder
            .find_overlapping_iter(&window[..len])
            .filter(|m| m.start() < complete && pos + m.end() as u64 > guess)
            .map(|m| m.start())
            .min();

        if let Some(start) = snapped {
            return Ok(pos + start as u64);
        }
        pos += BOUNDARY_SCAN_WINDOW as u64;
    }
    Ok(corpus_len)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;

    const EOT: &[u8] = b"<|endoftext|>";

    fn boundaries(
        data: &[u8],
        desired_chunks: usize,
        delimiters: &[&[u8]],
    ) -> Vec<u64> {
        let mut reader = Cursor::new(data);
        find_chunk_boundaries(&mut reader, data.len() as u64, desired_chunks, delimiters).unwrap()
    }

    /// Every ``(start, end)`` occurrence of any delimiter, overlaps included.
    fn occurrences(
        data: &[u8],
        delimiters: &[&[u8]],
    ) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for d in delimiters {
            for (i, w) in data.windows(d.len()).enumerate() {
                if w == *d {
                    found.push((i, i + d.len()));
                }
            }
        }
        found
    }

    #[test]
    fn test_empty_corpus() {
        assert_eq!(boundaries(b"", 4, &[EOT]), vec![0]);
    }

    #[test]
    fn test_zero_chunks_is_one() {
        assert_eq!(boundaries(b"abc<|endoftext|>def", 0, &[EOT]), vec![0, 19]);
    }

    #[test]
    fn test_no_delimiters() {
        assert_eq!(boundaries(b"hello world", 4, &[]), vec![0, 11]);
        assert_eq!(boundaries(b"hello world", 4, &[&b""[..]]), vec![0, 11]);
    }

    #[test]
    fn test_snap_to_delimiter() {
        let data = b"aaaa<|endoftext|>bbbb<|endoftext|>cccc";
        //           0   4             17  21            34  38
        assert_eq!(boundaries(data, 2, &[EOT]), vec![0, 21, 38]);

        // A guess inside a delimiter snaps back to its start.
        assert_eq!(boundaries(data, 3, &[EOT]), vec![0, 4, 21, 38]);

        // Guesses past the last delimiter snap to the end.
        assert_eq!(boundaries(b"<|endoftext|>aaaaaaaaaaaa", 4, &[EOT]), vec![0, 25]);
    }

    #[test]
    fn test_earliest_of_many_delimiters() {
        let data = b"xxxxxxxxxxxx<b>y<a>zzz";
        assert_eq!(
            boundaries(data, 2, &[&b"<a>"[..], &b"<b>"[..]]),
            vec![0, 12, 22]
        );
    }

    #[test]
    fn test_nested_delimiters() {
        let delimiters: &[&[u8]] = &[&b"<a><b>"[..], &b"<b>"[..]];

        // The guess at 6 lands inside ``<a><b>`` at ``[3, 9)``.
        assert_eq!(boundaries(b"xxx<a><b>yyy", 2, delimiters), vec![0, 3, 12]);

        // A lone inner delimiter is still a boundary.
        assert_eq!(boundaries(b"xxxxxx<b>yyy", 2, delimiters), vec![0, 6, 12]);
    }

    #[test]
    fn test_guess_inside_delimiter_snaps_back() {
        let mut data = vec![b'a'; 20_000];
        let at = 10_000 - 4;
        data[at..at + EOT.len()].copy_from_slice(EOT);

        assert_eq!(boundaries(&data, 2, &[EOT]), vec![0, at as u64, 20_000]);
    }

    #[test]
    fn test_delimiter_straddles_window() {
        let mut data = vec![b'a'; 20_000];
        let at = 10_000 + BOUNDARY_SCAN_WINDOW - 5;
        data[at..at + EOT.len()].copy_from_slice(EOT);

        assert_eq!(boundaries(&data, 2, &[EOT]), vec![0, at as u64, 20_000]);
    }

    #[test]
    fn test_fewer_chunks_than_requested() {
        let data = b"ab<|endoftext|>cd";
        let b = boundaries(data, 64, &[EOT]);
        assert_eq!(b, vec![0, 2, 17]);
    }

    fn corpus_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(
            prop_oneof![
                4 => "[ab<|>x ]{0,64}".prop_map(|s| s.into_bytes()),
                1 => Just(EOT.to_vec()),
                1 => Just(b"<|pad|>".to_vec()),
                1 => Just(b"<|a|><|pad|>".to_vec()),
            ],
            0..300,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn boundaries_never_cut_a_delimiter(
            data in corpus_strategy(),
            desired_chunks in 0usize..24,
        ) {
            let delimiters: &[&[u8]] = &[EOT, &b"<|pad|>"[..], &b"<|a|><|pad|>"[..]];
            let b = boundaries(&data, desired_chunks, delimiters);

            prop_assert_eq!(b[0], 0);
            prop_assert_eq!(*b.last().unwrap(), data.len() as u64);
            prop_assert!(b.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(b.len() <= desired_chunks.max(1) + 1);

            let found = occurrences(&data, delimiters);
            for &cut in b.iter().skip(1).take(b.len().saturating_sub(2)) {
                let cut = cut as usize;
                prop_assert!(
                    found.iter().any(|&(s, _)| s == cut),
                    "cut {} is not a delimiter start",
                    cut
                );
                prop_assert!(
                    found.iter().all(|&(s, e)| !(s < cut && cut < e)),
                    "cut {} splits a delimiter",
                    cut
                );
            }
        }
    }
}
