//! Image table parsing and building
//!
//! The image table starts at [`TABLE_OFFSET`] and is a bare sequence of
//! [`BLOCK_SIZE`]-byte pixel blocks. It has no header or count; the number of
//! blocks is the number of signatures in the key index.

use crate::block::PixelBlock;
use crate::error::{FormatError, FormatResult};
use crate::layout::{BLOCK_SIZE, TABLE_OFFSET};
use binrw::io::{Read, Seek, SeekFrom, Write};
use std::io::{BufWriter, ErrorKind};

/// Pixel blocks in index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTable {
    blocks: Vec<PixelBlock>,
}

impl ImageTable {
    /// Read `count` consecutive blocks from the start of the image table
    pub fn read<R: Read + Seek>(reader: &mut R, count: usize) -> FormatResult<Self> {
        reader.seek(SeekFrom::Start(TABLE_OFFSET))?;

        let mut blocks = Vec::with_capacity(count);
        for position in 0..count {
            blocks.push(read_next(reader, position)?);
        }

        Ok(Self { blocks })
    }

    /// Read the block at `position` without reading the ones before it
    pub fn read_block<R: Read + Seek>(reader: &mut R, position: usize) -> FormatResult<PixelBlock> {
        reader.seek(SeekFrom::Start(
            TABLE_OFFSET + (position * BLOCK_SIZE) as u64,
        ))?;
        read_next(reader, position)
    }

    /// Consume the table and return its blocks
    pub fn into_blocks(self) -> Vec<PixelBlock> {
        self.blocks
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the table holds no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Write blocks consecutively from the start of the image table
///
/// Accepts borrowed blocks so callers holding `(signature, block)` entries
/// don't have to split them into an owned table first.
pub fn write_blocks<'a, W, I>(writer: &mut W, blocks: I) -> FormatResult<()>
where
    W: Write + Seek,
    I: IntoIterator<Item = &'a PixelBlock>,
{
    writer.seek(SeekFrom::Start(TABLE_OFFSET))?;
    let mut out = BufWriter::new(writer);
    for block in blocks {
        out.write_all(block.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn read_next<R: Read>(reader: &mut R, position: usize) -> FormatResult<PixelBlock> {
    let mut bytes = vec![0u8; BLOCK_SIZE];
    let actual = read_full(reader, &mut bytes)?;
    if actual < BLOCK_SIZE {
        return Err(FormatError::TruncatedBlock {
            block: position,
            expected: BLOCK_SIZE,
            actual,
        });
    }
    PixelBlock::from_bytes(bytes)
}

/// Fill `buf` from `reader`, returning fewer bytes only at end of input
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> FormatResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn file_with_blocks(blocks: &[PixelBlock]) -> Cursor<Vec<u8>> {
        let mut data = vec![0u8; TABLE_OFFSET as usize];
        for block in blocks {
            data.extend_from_slice(block.as_bytes());
        }
        Cursor::new(data)
    }

    #[test]
    fn test_read_blocks_in_order() {
        let blocks = [PixelBlock::filled([1, 1, 1, 1]), PixelBlock::filled([2, 2, 2, 2])];
        let mut file = file_with_blocks(&blocks);

        let table = ImageTable::read(&mut file, 2).expect("read should succeed");
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_blocks(), blocks.to_vec());

        // Reading fewer than available is fine
        let first = ImageTable::read(&mut file, 1).unwrap();
        assert_eq!(first.into_blocks(), vec![blocks[0].clone()]);
    }

    #[test]
    fn test_read_single_block() {
        let blocks = [
            PixelBlock::filled([1, 1, 1, 1]),
            PixelBlock::filled([2, 2, 2, 2]),
            PixelBlock::filled([3, 3, 3, 3]),
        ];
        let mut file = file_with_blocks(&blocks);

        assert_eq!(ImageTable::read_block(&mut file, 2).unwrap(), blocks[2]);
        assert_eq!(ImageTable::read_block(&mut file, 0).unwrap(), blocks[0]);
        let err = ImageTable::read_block(&mut file, 3).unwrap_err();
        assert!(matches!(err, FormatError::TruncatedBlock { block: 3, actual: 0, .. }));
    }

    #[test]
    fn test_read_zero_blocks_from_bare_file() {
        let mut file = Cursor::new(vec![0u8; TABLE_OFFSET as usize]);
        assert!(ImageTable::read(&mut file, 0).unwrap().is_empty());
    }

    #[test]
    fn test_read_truncated_block() {
        let mut data = file_with_blocks(&[PixelBlock::filled([3, 3, 3, 3])]).into_inner();
        data.extend_from_slice(&[0u8; 100]);

        let err = ImageTable::read(&mut Cursor::new(data), 2).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedBlock {
                block: 1,
                expected: BLOCK_SIZE,
                actual: 100
            }
        ));
        assert!(err.is_truncated());
    }

    #[test]
    fn test_write_grows_file_and_keeps_prefix() {
        let mut file = Cursor::new(vec![0x5Au8; TABLE_OFFSET as usize]);
        let blocks = [PixelBlock::filled([9, 8, 7, 6]), PixelBlock::filled([5, 4, 3, 2])];
        write_blocks(&mut file, &blocks).unwrap();

        let data = file.into_inner();
        assert_eq!(data.len(), TABLE_OFFSET as usize + 2 * BLOCK_SIZE);
        assert!(data[..TABLE_OFFSET as usize].iter().all(|&b| b == 0x5A));

        let second = TABLE_OFFSET as usize + BLOCK_SIZE;
        assert_eq!(&data[second..second + 4], &[5, 4, 3, 2]);
        assert_eq!(data[data.len() - 1], 0xFF);
    }

    #[test]
    fn test_write_blocks_overwrites_in_place() {
        let old = PixelBlock::filled([1, 1, 1, 1]);
        let new = PixelBlock::filled([2, 2, 2, 2]);
        let mut file = file_with_blocks(&[old.clone(), old]);

        write_blocks(&mut file, [&new]).unwrap();
        let blocks = ImageTable::read(&mut file, 2).unwrap().into_blocks();
        assert_eq!(blocks, vec![new, PixelBlock::filled([1, 1, 1, 1])]);
    }
}
