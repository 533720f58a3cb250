//! Synthetic .xz containers for index tests.
//!
//! Blocks are opaque filler bytes: the reconstructor never looks inside a
//! Block, it only needs the Index to describe their sizes correctly.

#![allow(dead_code)]

use oxixz_core::crc::Crc32;
use oxixz_index::{CheckType, StreamFlags, encode_vli};

/// One Stream to be written by [`XzFixture`].
#[derive(Debug, Clone)]
pub struct StreamSpec {
    /// Check type written into the Stream Header.
    pub header_check: CheckType,
    /// Check type written into the Stream Footer.
    pub footer_check: CheckType,
    /// (Unpadded Size, Uncompressed Size) per Block.
    pub blocks: Vec<(u64, u64)>,
    /// Stream Padding after the footer.
    pub padding: usize,
}

impl StreamSpec {
    pub fn new(check: CheckType) -> Self {
        Self {
            header_check: check,
            footer_check: check,
            blocks: Vec::new(),
            padding: 0,
        }
    }

    pub fn block(mut self, unpadded: u64, uncompressed: u64) -> Self {
        self.blocks.push((unpadded, uncompressed));
        self
    }

    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn header_check(mut self, check: CheckType) -> Self {
        self.header_check = check;
        self
    }
}

/// Builds a file out of [`StreamSpec`]s.
#[derive(Debug, Default)]
pub struct XzFixture {
    streams: Vec<StreamSpec>,
}

impl XzFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(mut self, stream: StreamSpec) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for stream in &self.streams {
            write_stream(&mut out, stream);
        }
        out
    }
}

/// Encode an Index field.
pub fn encode_index(blocks: &[(u64, u64)]) -> Vec<u8> {
    let mut index = vec![0x00];
    encode_vli(&mut index, blocks.len() as u64).unwrap();
    for &(unpadded, uncompressed) in blocks {
        encode_vli(&mut index, unpadded).unwrap();
        encode_vli(&mut index, uncompressed).unwrap();
    }
    while index.len() % 4 != 0 {
        index.push(0);
    }
    let crc = Crc32::compute(&index);
    index.extend_from_slice(&crc.to_le_bytes());
    index
}

fn write_stream(out: &mut Vec<u8>, stream: &StreamSpec) {
    let header = StreamFlags::new(stream.header_check);
    out.extend_from_slice(&header.encode_header().unwrap());

    for (i, &(unpadded, _)) in stream.blocks.iter().enumerate() {
        // Filler must not look like padding or a footer to a backward scan.
        out.extend(std::iter::repeat_n(0x40 + (i % 32) as u8, unpadded as usize));
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }

    let index = encode_index(&stream.blocks);
    let footer = StreamFlags::new(stream.footer_check).with_backward_size(index.len() as u64);
    out.extend_from_slice(&index);
    out.extend_from_slice(&footer.encode_footer().unwrap());
    out.extend(std::iter::repeat_n(0u8, stream.padding));
}

/// Offset of the Stream Footer of the last Stream, ignoring trailing padding.
pub fn last_footer_offset(data: &[u8], trailing_padding: usize) -> usize {
    data.len() - trailing_padding - 12
}
