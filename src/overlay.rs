//! Computed attribute accessors over the image pixel module.
//!
//! A dataset caches its decoded pixel array,
//! which makes some stored attributes stale the moment the
//! array (or the raw pixel buffer) changes.
//! An [`AttributeOverlay`] lets a metadata schema declare,
//! per attribute keyword, a function that derives the
//! exposed value from the current decoded-array state
//! instead of the stored element.
//! Keyword resolution from tags is delegated to a
//! [`TagDictionary`] collaborator;
//! this module implements no tag lookup of its own.

use std::collections::HashMap;
use std::fmt;

/// A DICOM attribute tag (group, element).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16, pub u16);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Tag dictionary collaborator:
/// resolves a tag into the attribute keyword the overlay keys on.
pub trait TagDictionary {
    fn field_name_for(&self, tag: Tag) -> Option<&'static str>;
}

/// The attribute values the image pixel overlay traffics in.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    U16(u16),
    U32(u32),
    Str(String),
    Bytes(Vec<u8>),
}

/// A stored data element.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    pub tag: Tag,
    pub value: AttrValue,
}

/// Decoded-array state the computed accessors read from.
///
/// Holds the shape of the most recently decoded pixel array,
/// or nothing when the array has been invalidated
/// by a write to the pixel data.
#[derive(Debug, Default, Clone)]
pub struct PixelState {
    shape: Option<Vec<usize>>,
    multi_frame: bool,
}

impl PixelState {
    /// Record the shape of a freshly decoded array.
    pub fn set_decoded(&mut self, shape: &[usize], multi_frame: bool) {
        self.shape = Some(shape.to_vec());
        self.multi_frame = multi_frame;
    }

    /// Drop the cached shape; derived fields fall back to storage.
    pub fn invalidate(&mut self) {
        self.shape = None;
    }

    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// The index of the rows axis in the current shape.
    fn rows_axis(&self) -> usize {
        if self.multi_frame {
            1
        } else {
            0
        }
    }
}

/// A computed accessor:
/// derives the exposed value from the decoded-array state,
/// or `None` when no derived value applies
/// (in which case the stored element passes through).
pub type ComputedAccessor = fn(&PixelState, &DataElement) -> Option<AttrValue>;

/// Intercepts reads and writes of specific attributes
/// so that derived values stay consistent with the decoded array.
pub struct AttributeOverlay<D> {
    dict: D,
    accessors: HashMap<&'static str, ComputedAccessor>,
    invalidators: Vec<&'static str>,
}

impl<D: TagDictionary> AttributeOverlay<D> {
    pub fn new(dict: D) -> Self {
        AttributeOverlay {
            dict,
            accessors: HashMap::new(),
            invalidators: Vec::new(),
        }
    }

    /// Register a computed accessor for the given attribute keyword.
    pub fn with_accessor(mut self, field: &'static str, accessor: ComputedAccessor) -> Self {
        self.accessors.insert(field, accessor);
        self
    }

    /// Mark writes to the given attribute keyword
    /// as invalidating the decoded-array state.
    pub fn with_invalidator(mut self, field: &'static str) -> Self {
        self.invalidators.push(field);
        self
    }

    /// Intercept a read:
    /// when a computed accessor is registered for the field
    /// resolved from the element's tag and it yields a value,
    /// return an element carrying that value;
    /// otherwise the stored element passes through unchanged.
    pub fn get_item(&self, state: &PixelState, stored: &DataElement) -> DataElement {
        let derived = self
            .dict
            .field_name_for(stored.tag)
            .and_then(|name| self.accessors.get(name))
            .and_then(|accessor| accessor(state, stored));
        match derived {
            Some(value) => DataElement {
                tag: stored.tag,
                value,
            },
            None => stored.clone(),
        }
    }

    /// Intercept a write:
    /// the element goes into storage,
    /// and a write to an invalidating field
    /// drops the cached array state so that dependent
    /// derived fields are recomputed from fresh data.
    pub fn set_item(
        &self,
        state: &mut PixelState,
        store: &mut HashMap<Tag, DataElement>,
        element: DataElement,
    ) {
        if let Some(name) = self.dict.field_name_for(element.tag) {
            if self.invalidators.contains(&name) {
                state.invalidate();
            }
        }
        store.insert(element.tag, element);
    }
}

/// The image pixel module tags this crate knows by name.
#[derive(Debug, Default, Copy, Clone)]
pub struct ImagePixelDictionary;

pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

impl TagDictionary for ImagePixelDictionary {
    fn field_name_for(&self, tag: Tag) -> Option<&'static str> {
        match tag {
            ROWS => Some("Rows"),
            COLUMNS => Some("Columns"),
            SAMPLES_PER_PIXEL => Some("SamplesPerPixel"),
            BITS_ALLOCATED => Some("BitsAllocated"),
            PIXEL_DATA => Some("PixelData"),
            _ => None,
        }
    }
}

fn rows_from_shape(state: &PixelState, _stored: &DataElement) -> Option<AttrValue> {
    let shape = state.shape()?;
    shape
        .get(state.rows_axis())
        .map(|&rows| AttrValue::U16(rows as u16))
}

fn cols_from_shape(state: &PixelState, _stored: &DataElement) -> Option<AttrValue> {
    let shape = state.shape()?;
    shape
        .get(state.rows_axis() + 1)
        .map(|&cols| AttrValue::U16(cols as u16))
}

/// The stock overlay for the image pixel module:
/// _Rows_ and _Columns_ are derived from the current array shape,
/// and writes to _Pixel Data_ invalidate that shape.
pub fn image_pixel_overlay() -> AttributeOverlay<ImagePixelDictionary> {
    AttributeOverlay::new(ImagePixelDictionary)
        .with_accessor("Rows", rows_from_shape)
        .with_accessor("Columns", cols_from_shape)
        .with_invalidator("PixelData")
}
