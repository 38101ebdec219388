//! Filesystem side of the tool: finding, reading and writing notes

pub mod reader;
pub mod resolver;
pub mod writer;

pub use reader::{is_markdown_file, NoteReader, ReaderConfig};
pub use resolver::{FileResolver, ResolvedFile, ResolverConfig};
pub use writer::{
    generate_diff, output_path, BackupOptions, NoteWriter, OutputOptions, WriteOptions,
    WriteResult, WriterConfig,
};
