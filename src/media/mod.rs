pub mod asf;
pub mod bits;
pub mod codecs;
pub mod container;
pub mod demux;
pub mod elementary;
pub mod headers;
pub mod item;
pub mod mime;
pub mod mpeg;
pub mod scanner;
