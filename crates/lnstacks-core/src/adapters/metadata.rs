//! Auxiliary arrays copied from an input HDF5 group to the output group.
//!
//! Three categories are handled independently: rotation angles, energy, and
//! the x/y pixel-size pair. A category that cannot be read or written is
//! logged and left out; it never aborts the conversion.

use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::Group;
use ndarray::ArrayD;

use crate::error::{Error, Result};
use crate::models::CopiedMetadata;

pub const ROTATION_ANGLE: &str = "rotation_angle";
pub const ENERGY: &str = "energy";
pub const X_PIXEL_SIZE: &str = "x_pixel_size";
pub const Y_PIXEL_SIZE: &str = "y_pixel_size";

macro_rules! metadata_array {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A metadata dataset read whole, in its source element type.
        /// Scalars are 0-d arrays.
        #[derive(Debug, Clone, PartialEq)]
        pub enum MetadataArray {
            $($variant(ArrayD<$ty>),)*
        }

        impl MetadataArray {
            fn write(&self, group: &Group, name: &str) -> Result<()> {
                match self {
                    $(Self::$variant(data) => {
                        group.new_dataset_builder().with_data(data).create(name)?;
                    })*
                }
                Ok(())
            }

            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(data) => data.len(),)*
                }
            }
        }
    };
}

metadata_array! {
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Ascii(VarLenAscii),
    Unicode(VarLenUnicode),
}

impl MetadataArray {
    fn read(group: &Group, name: &str) -> Result<Self> {
        if !group.link_exists(name) {
            return Err(Error::not_found(group.filename(), format!("dataset {}", name)));
        }
        let dataset = group.dataset(name)?;
        let array = match dataset.dtype()?.to_descriptor()? {
            TypeDescriptor::Float(FloatSize::U4) => Self::F32(dataset.read_dyn()?),
            TypeDescriptor::Float(_) => Self::F64(dataset.read_dyn()?),
            TypeDescriptor::Integer(IntSize::U1) => Self::I8(dataset.read_dyn()?),
            TypeDescriptor::Integer(IntSize::U2) => Self::I16(dataset.read_dyn()?),
            TypeDescriptor::Integer(IntSize::U4) => Self::I32(dataset.read_dyn()?),
            TypeDescriptor::Integer(IntSize::U8) => Self::I64(dataset.read_dyn()?),
            TypeDescriptor::Unsigned(IntSize::U1) => Self::U8(dataset.read_dyn()?),
            TypeDescriptor::Unsigned(IntSize::U2) => Self::U16(dataset.read_dyn()?),
            TypeDescriptor::Unsigned(IntSize::U4) => Self::U32(dataset.read_dyn()?),
            TypeDescriptor::Unsigned(IntSize::U8) => Self::U64(dataset.read_dyn()?),
            TypeDescriptor::Boolean => Self::Bool(dataset.read_dyn()?),
            TypeDescriptor::VarLenAscii => Self::Ascii(dataset.read_dyn()?),
            TypeDescriptor::VarLenUnicode => Self::Unicode(dataset.read_dyn()?),
            other => {
                return Err(Error::InvalidInput(format!(
                    "dataset {} has unsupported type {:?}",
                    name, other
                )))
            }
        };
        Ok(array)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Metadata found next to the stack dataset. Each field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataBundle {
    pub rotation_angle: Option<MetadataArray>,
    pub energy: Option<MetadataArray>,
    pub pixel_size: Option<(MetadataArray, MetadataArray)>,
}

impl MetadataBundle {
    /// Read every category from `group`, logging the ones that are missing.
    pub fn extract(group: &Group) -> Self {
        let rotation_angle = MetadataArray::read(group, ROTATION_ANGLE)
            .map_err(|e| log::warn!("Angles could not be extracted: {}", e))
            .ok();

        let energy = MetadataArray::read(group, ENERGY)
            .map_err(|e| log::warn!("Energies could not be extracted: {}", e))
            .ok();

        let pixel_size = read_pixel_size(group)
            .map_err(|e| log::warn!("Pixel size could not be extracted: {}", e))
            .ok();

        Self {
            rotation_angle,
            energy,
            pixel_size,
        }
    }

    /// Write whatever was extracted into `group`.
    pub fn write_to(&self, group: &Group) -> CopiedMetadata {
        let mut copied = CopiedMetadata::default();

        if let Some(angles) = &self.rotation_angle {
            copied.rotation_angle = angles
                .write(group, ROTATION_ANGLE)
                .map_err(|e| log::warn!("Angles could not be copied: {}", e))
                .is_ok();
        }

        if let Some(energy) = &self.energy {
            copied.energy = energy
                .write(group, ENERGY)
                .map_err(|e| log::warn!("Energies could not be copied: {}", e))
                .is_ok();
        }

        if let Some((x, y)) = &self.pixel_size {
            copied.pixel_size = write_pixel_size(group, x, y)
                .map_err(|e| log::warn!("Pixel size could not be copied: {}", e))
                .is_ok();
        }

        copied
    }
}

/// Both sizes or neither.
fn read_pixel_size(group: &Group) -> Result<(MetadataArray, MetadataArray)> {
    let x = MetadataArray::read(group, X_PIXEL_SIZE)?;
    let y = MetadataArray::read(group, Y_PIXEL_SIZE)?;
    Ok((x, y))
}

fn write_pixel_size(group: &Group, x: &MetadataArray, y: &MetadataArray) -> Result<()> {
    x.write(group, X_PIXEL_SIZE)?;
    if let Err(e) = y.write(group, Y_PIXEL_SIZE) {
        if let Err(unlink) = group.unlink(X_PIXEL_SIZE) {
            log::debug!("could not unlink {}: {}", X_PIXEL_SIZE, unlink);
        }
        return Err(e);
    }
    Ok(())
}
