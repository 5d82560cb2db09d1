pub mod codec;
pub mod container;
pub mod error;
pub mod mode;
pub mod orchestrator;
pub mod staging;

pub use codec::{Codec, CodecOptions, Stats};
pub use error::{ArchiveError, Result};
pub use mode::Mode;
pub use orchestrator::{ArchiveRequest, Kind, Summary, run};
pub use staging::StagingFile;
