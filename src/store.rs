use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument};

use crate::archive::{archive_name, Archiver};
use crate::config::Config;
use crate::context::{DeviceIdentifier, RootFolder};
use crate::encode::{self, EncodeError};
use crate::file;
use crate::framing::{Arity, FieldValue};
use crate::record::{parse_file, ParseError, Record};
use crate::registry::{self, Collected, FolderError};
use crate::schema::BuildError;

#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("Could not encode entry: {0}")]
    Encode(#[from] EncodeError),
    #[error("Could not append entry to data file: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Could not store sample: {0}")]
    Append(#[from] AppendError),
    #[error("Stored sample does not form a valid record: {0}")]
    Build(#[from] BuildError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing collected yet, there is nothing to export")]
    NoData,
    #[error("Could not check the data folder: {0}")]
    Listing(io::Error),
    #[error("Archiver failed: {0}")]
    Archive(io::Error),
}

/// One file per record type inside a device's root folder.
///
/// All appends, whatever their record type, go through a single lock so
/// entries never interleave. Parsing takes no lock.
#[derive(Debug)]
pub struct Store {
    root: RootFolder,
    read_buffer: usize,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(root: RootFolder, config: &Config) -> Self {
        Self {
            root,
            read_buffer: config.read_buffer,
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve the root folder for this device and create a store in it.
    ///
    /// # Errors
    /// If the root folder does not exist and can not be created.
    pub fn open(config: &Config, ids: &impl DeviceIdentifier) -> io::Result<Self> {
        let root = RootFolder::resolve(config, ids)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &RootFolder {
        &self.root
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.path().join(file_name)
    }

    /// Encode one entry and append it to `file_name`.
    ///
    /// # Errors
    /// If a payload contains the record separator nothing is written.
    /// I/O errors are passed on as is.
    ///
    /// # Panics
    /// If `values` does not match `layout`.
    #[instrument(level = "debug", skip(self, layout, values))]
    pub fn append(
        &self,
        file_name: &str,
        layout: &[Arity],
        values: &[FieldValue],
    ) -> Result<(), AppendError> {
        let entry = encode::encode(layout, values)?;
        self.write(file_name, &entry)
    }

    /// [`append`](Store::append) for entries without list fields.
    ///
    /// # Errors
    /// See [`append`](Store::append).
    #[instrument(level = "debug", skip(self, values))]
    pub fn append_scalars(&self, file_name: &str, values: &[Vec<u8>]) -> Result<(), AppendError> {
        let entry = encode::encode_scalars(values)?;
        self.write(file_name, &entry)
    }

    fn write(&self, file_name: &str, entry: &[u8]) -> Result<(), AppendError> {
        let path = self.path_of(file_name);
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        file::append(&path, entry)?;
        debug!(bytes = entry.len(), "appended entry");
        Ok(())
    }

    /// Store a sample and return the record built from the stored field
    /// values. Payloads holding separator bytes are stored as is and parse
    /// back differently, see [`crate::framing`].
    ///
    /// # Errors
    /// If the sample could not be appended, or if it does not form a valid
    /// record. In the latter case the entry has already been written.
    pub fn save<R: Record>(&self, source: &R::Source) -> Result<R, SaveError> {
        let schema = R::schema();
        let values = schema.extract(source);
        if schema.has_lists() {
            self.append(R::FILE_NAME, schema.layout(), &values)?;
        } else {
            let scalars: Vec<Vec<u8>> = values
                .iter()
                .map(|value| match value {
                    FieldValue::Scalar(bytes) => bytes.clone(),
                    FieldValue::List(_) => unreachable!("schema has no list fields"),
                })
                .collect();
            self.append_scalars(R::FILE_NAME, &scalars)?;
        }
        Ok(schema.build(&values)?)
    }

    /// Every record of type `R` in append order.
    ///
    /// # Errors
    /// See [`parse_file`].
    pub fn parse<R: Record>(&self) -> Result<Vec<R>, ParseError> {
        parse_file::<R>(self.path_of(R::FILE_NAME), self.read_buffer)
    }

    /// Every record of every registered type.
    ///
    /// # Errors
    /// The first record type whose file could not be parsed.
    pub fn parse_all(&self) -> Result<Collected, FolderError> {
        registry::parse_folder_with_buffer(self.root.path(), self.read_buffer)
    }

    /// Whether anything was collected yet.
    ///
    /// # Errors
    /// If the root folder can not be read.
    pub fn has_data(&self) -> io::Result<bool> {
        Ok(!file::is_empty_or_absent(self.root.path())?)
    }

    /// # Errors
    /// If the root folder can not be read.
    pub fn files(&self) -> io::Result<Vec<PathBuf>> {
        file::list(self.root.path())
    }

    /// Pack the root folder into an archive next to it, named after the
    /// device and the current time: `<root>_<unix millis>`.
    ///
    /// The writer lock is held so no entry is half written while packing.
    ///
    /// # Errors
    /// If there is no data or the archiver fails.
    #[instrument(skip_all, fields(root = %self.root.path().display()))]
    pub fn export(&self, archiver: &impl Archiver) -> Result<PathBuf, ExportError> {
        if !self.has_data().map_err(ExportError::Listing)? {
            return Err(ExportError::NoData);
        }

        let millis = jiff::Timestamp::now().as_millisecond();
        let destination = sibling(self.root.path(), &archive_name(self.root.name(), millis));
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let archive = archiver
            .archive(self.root.path(), &destination)
            .map_err(ExportError::Archive)?;
        debug!(archive = %archive.display(), "exported data");
        Ok(archive)
    }
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
