//! Shared utilities for the deobfuscation pipeline.

pub(crate) mod lzstring;

pub use lzstring::decompress_from_utf16;
