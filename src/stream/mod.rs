pub mod inspect;
pub mod layout;
pub mod reader;

pub use layout::{ColorBlock, ColorEncoding, ColorResolution, DepthBlock, FrameRecord, StreamLayout};
pub use reader::RecordReader;
