//! Property metadata model
//!
//! This module contains the descriptor types a settings store works with:
//! - `ValueType` - Declared type of a property and assignability rules
//! - `PropertyDescriptor` - Identity, default and accessor metadata of one property
//! - `PropertyTable` - Per-type table of descriptors and accessor functions
//! - `Managed` - Trait giving a type its static property table

mod table;
mod types;

pub use table::{
    Managed, PropertyBuilder, PropertyDescriptor, PropertyEntry, PropertyId, PropertyTable,
    PropertyTableBuilder, ReadFn, WriteFn,
};
pub use types::{Accessor, ValueType, Visibility};
