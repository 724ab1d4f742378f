pub mod archive;
pub mod config;
pub mod context;
pub mod decode;
pub mod encode;
mod file;
pub mod framing;
pub mod record;
pub mod records;
pub mod registry;
pub mod schema;
mod store;
mod util;

pub use config::Config;
pub use context::{DeviceIdError, DeviceIdentifier, RootFolder};
pub use framing::{Arity, FieldValue};
pub use record::{parse_file, ParseError, Record};
pub use registry::{Collected, RecordKind, Sample};
pub use store::{AppendError, ExportError, SaveError, Store};
pub use util::FILES_ENCODING;
