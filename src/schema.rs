use core::fmt;
use std::collections::HashSet;

use itertools::Itertools;

use crate::framing::{Arity, FieldValue};
use crate::record::Record;

/// Why the bytes of a single field could not be turned into its value.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("Bytes are not ascii text")]
    NotAscii,
    #[error("Not an integer: {0}")]
    Integer(#[from] std::num::ParseIntError),
    #[error("Not a decimal number: {0}")]
    Decimal(#[from] std::num::ParseFloatError),
    #[error("Text is not valid UTF-8: {0}")]
    Text(#[from] std::string::FromUtf8Error),
    #[error("extra {extra} with no {missing}")]
    ExtraItems {
        extra: &'static str,
        missing: &'static str,
    },
    #[error("Field was never set")]
    Missing,
}

#[derive(Debug, thiserror::Error)]
#[error("Malformed field {field}: {cause}")]
pub struct BuildError {
    pub field: &'static str,
    #[source]
    pub cause: FieldError,
}

impl BuildError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self {
            field,
            cause: FieldError::Missing,
        }
    }
}

pub type ScalarExtract<R> = fn(&<R as Record>::Source) -> Vec<u8>;
pub type ListExtract<R> = fn(&<R as Record>::Source) -> Vec<Vec<u8>>;
pub type ScalarApply<R> = fn(&[u8], &mut <R as Record>::Builder) -> Result<(), FieldError>;
pub type ListApply<R> = fn(&[Vec<u8>], &mut <R as Record>::Builder) -> Result<(), FieldError>;

/// How a field gets its bytes out of a source and its value back into a
/// record. The variant fixes the arity for both directions.
pub enum Access<R: Record> {
    Scalar {
        extract: ScalarExtract<R>,
        apply: ScalarApply<R>,
    },
    List {
        extract: ListExtract<R>,
        apply: ListApply<R>,
    },
}

pub struct Field<R: Record> {
    pub name: &'static str,
    pub access: Access<R>,
}

impl<R: Record> Field<R> {
    pub const fn scalar(
        name: &'static str,
        extract: ScalarExtract<R>,
        apply: ScalarApply<R>,
    ) -> Self {
        Self {
            name,
            access: Access::Scalar { extract, apply },
        }
    }

    pub const fn list(name: &'static str, extract: ListExtract<R>, apply: ListApply<R>) -> Self {
        Self {
            name,
            access: Access::List { extract, apply },
        }
    }

    pub fn arity(&self) -> Arity {
        match self.access {
            Access::Scalar { .. } => Arity::Scalar,
            Access::List { .. } => Arity::List,
        }
    }

    fn extract(&self, source: &R::Source) -> FieldValue {
        match &self.access {
            Access::Scalar { extract, .. } => FieldValue::Scalar(extract(source)),
            Access::List { extract, .. } => FieldValue::List(extract(source)),
        }
    }

    fn apply(&self, value: &FieldValue, builder: &mut R::Builder) -> Result<(), BuildError> {
        let res = match (&self.access, value) {
            (Access::Scalar { apply, .. }, FieldValue::Scalar(bytes)) => apply(bytes, builder),
            (Access::List { apply, .. }, FieldValue::List(items)) => apply(items, builder),
            (_, value) => panic!(
                "field {} is {:?} but was handed a {:?} value",
                self.name,
                self.arity(),
                value.arity()
            ),
        };
        res.map_err(|cause| BuildError {
            field: self.name,
            cause,
        })
    }
}

impl<R: Record> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish()
    }
}

/// The ordered fields of a record type. The position of a field in the
/// schema is its position on disk.
pub struct Schema<R: Record> {
    fields: Vec<Field<R>>,
    layout: Vec<Arity>,
}

impl<R: Record> Schema<R> {
    /// # Panics
    /// If `fields` is empty or two fields share a name.
    pub fn new(fields: Vec<Field<R>>) -> Self {
        assert!(!fields.is_empty(), "a schema needs at least one field");
        let mut seen = HashSet::new();
        for field in &fields {
            assert!(
                seen.insert(field.name),
                "field name {} is used twice in one schema",
                field.name
            );
        }
        let layout = fields.iter().map(Field::arity).collect();
        Self { fields, layout }
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    /// Arity of every field in order, all the encoder and decoder need.
    pub fn layout(&self) -> &[Arity] {
        &self.layout
    }

    pub fn has_lists(&self) -> bool {
        self.layout.contains(&Arity::List)
    }

    /// One value per field, in schema order.
    pub fn extract(&self, source: &R::Source) -> Vec<FieldValue> {
        self.fields.iter().map(|f| f.extract(source)).collect()
    }

    /// Apply every field in order to a fresh builder, then finish it.
    ///
    /// # Panics
    /// If `values` does not match the layout, the decoder guarantees it does.
    pub fn build(&self, values: &[FieldValue]) -> Result<R, BuildError> {
        let mut builder = R::Builder::default();
        for (field, value) in self.fields.iter().zip_eq(values) {
            field.apply(value, &mut builder)?;
        }
        R::finish(builder)
    }
}

impl<R: Record> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}
