//! Property descriptors and per-type descriptor tables

use super::types::{Accessor, ValueType, Visibility};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Getter of a property on `T`
pub type ReadFn<T> = fn(&T) -> Result<Value>;

/// Setter of a property on `T`
pub type WriteFn<T> = fn(&mut T, Value) -> Result<()>;

// =============================================================================
// Descriptor
// =============================================================================

/// Identity of a property: owning type name plus property name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// Immutable metadata record of one property
///
/// Equality and hashing only consider the identity (`owner`, `name`).
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    id: PropertyId,
    value_type: ValueType,
    default: Option<Value>,
    managed: bool,
    nullable: bool,
    read: Option<Accessor>,
    write: Option<Accessor>,
}

impl PropertyDescriptor {
    /// Create an unmanaged descriptor with public, overridable accessors
    pub fn new(owner: impl Into<String>, name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: PropertyId {
                owner: owner.into(),
                name: name.into(),
            },
            value_type,
            default: None,
            managed: false,
            nullable: false,
            read: Some(Accessor::public()),
            write: Some(Accessor::public()),
        }
    }

    /// Mark the property as store-backed
    #[must_use]
    pub fn managed(mut self) -> Self {
        self.managed = true;
        self
    }

    /// Declare a default value
    ///
    /// The default is never converted: if it does not match the declared
    /// type, reads falling back to it fail. A `null` default declares no
    /// default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = (!value.is_null()).then_some(value);
        self
    }

    /// The property holds an optional value
    ///
    /// With nothing stored and no default it reads as `null` instead of the
    /// zero value of its type.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Replace the getter metadata (`None` = no getter)
    #[must_use]
    pub fn read_accessor(mut self, accessor: Option<Accessor>) -> Self {
        self.read = accessor;
        self
    }

    /// Replace the setter metadata (`None` = no setter)
    #[must_use]
    pub fn write_accessor(mut self, accessor: Option<Accessor>) -> Self {
        self.write = accessor;
        self
    }

    pub fn id(&self) -> &PropertyId {
        &self.id
    }

    /// Fully qualified name of the owning type
    pub fn owner(&self) -> &str {
        &self.id.owner
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn read(&self) -> Option<Accessor> {
        self.read
    }

    pub fn write(&self) -> Option<Accessor> {
        self.write
    }

    /// `"<owner>.<name>"`
    pub fn qualified_name(&self) -> String {
        self.id.to_string()
    }
}

impl PartialEq for PropertyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PropertyDescriptor {}

impl std::hash::Hash for PropertyDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// =============================================================================
// Table
// =============================================================================

/// One row of a [`PropertyTable`]: descriptor plus accessor functions
pub struct PropertyEntry<T> {
    descriptor: Arc<PropertyDescriptor>,
    read: Option<ReadFn<T>>,
    write: Option<WriteFn<T>>,
}

impl<T> PropertyEntry<T> {
    pub fn descriptor(&self) -> &Arc<PropertyDescriptor> {
        &self.descriptor
    }

    /// Call the original getter
    ///
    /// # Errors
    ///
    /// Returns `MalformedInvocation` if the property has no getter.
    pub fn read_from(&self, target: &T) -> Result<Value> {
        let read = self.read.ok_or_else(|| Error::MalformedInvocation {
            property: self.descriptor.qualified_name(),
            reason: "property has no getter".into(),
        })?;
        read(target)
    }

    /// Call the original setter
    ///
    /// # Errors
    ///
    /// Returns `MalformedInvocation` if the property has no setter.
    pub fn write_to(&self, target: &mut T, value: Value) -> Result<()> {
        let write = self.write.ok_or_else(|| Error::MalformedInvocation {
            property: self.descriptor.qualified_name(),
            reason: "property has no setter".into(),
        })?;
        write(target, value)
    }
}

impl<T> std::fmt::Debug for PropertyEntry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyEntry")
            .field("descriptor", &self.descriptor)
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// Statically built descriptor table of one type
///
/// Built once (usually inside a `OnceLock`) and never mutated; lookups by
/// property name are O(1).
pub struct PropertyTable<T> {
    type_name: String,
    entries: Vec<PropertyEntry<T>>,
    index: HashMap<String, usize>,
}

impl<T> PropertyTable<T> {
    /// Start building the table of the type named `type_name`
    pub fn builder(type_name: impl Into<String>) -> PropertyTableBuilder<T> {
        PropertyTableBuilder {
            type_name: type_name.into(),
            entries: Vec::new(),
        }
    }

    /// Fully qualified name of the owning type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&PropertyEntry<T>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Look up a property, failing if the type has none by that name
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if no property is named `name`.
    pub fn entry(&self, name: &str) -> Result<&PropertyEntry<T>> {
        self.get(name).ok_or_else(|| Error::UnknownProperty {
            owner: self.type_name.clone(),
            property: name.to_string(),
        })
    }

    pub fn descriptor(&self, name: &str) -> Option<&Arc<PropertyDescriptor>> {
        self.get(name).map(PropertyEntry::descriptor)
    }

    /// All properties in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyEntry<T>> {
        self.entries.iter()
    }

    /// Managed properties in declaration order
    pub fn managed(&self) -> impl Iterator<Item = &Arc<PropertyDescriptor>> {
        self.entries
            .iter()
            .map(PropertyEntry::descriptor)
            .filter(|d| d.is_managed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> std::fmt::Debug for PropertyTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyTable")
            .field("type_name", &self.type_name)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Builder for [`PropertyTable`]
pub struct PropertyTableBuilder<T> {
    type_name: String,
    entries: Vec<PropertyEntry<T>>,
}

impl<T> PropertyTableBuilder<T> {
    /// Start describing a property of the table's type
    pub fn property(self, name: impl Into<String>, value_type: ValueType) -> PropertyBuilder<T> {
        PropertyBuilder {
            descriptor: PropertyDescriptor::new(self.type_name.clone(), name, value_type),
            table: self,
            read: None,
            write: None,
            read_visibility: Visibility::Public,
            write_visibility: Visibility::Public,
            overridable: true,
        }
    }

    /// Finish the table
    ///
    /// A property declared twice keeps its first declaration.
    pub fn build(self) -> PropertyTable<T> {
        let mut index = HashMap::with_capacity(self.entries.len());
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            if index.contains_key(entry.descriptor.name()) {
                log::warn!(
                    "Duplicate property '{}' ignored",
                    entry.descriptor.qualified_name()
                );
                continue;
            }
            index.insert(entry.descriptor.name().to_string(), entries.len());
            entries.push(entry);
        }

        PropertyTable {
            type_name: self.type_name,
            entries,
            index,
        }
    }
}

/// Builder for one property of a [`PropertyTableBuilder`]
pub struct PropertyBuilder<T> {
    table: PropertyTableBuilder<T>,
    descriptor: PropertyDescriptor,
    read: Option<ReadFn<T>>,
    write: Option<WriteFn<T>>,
    read_visibility: Visibility,
    write_visibility: Visibility,
    overridable: bool,
}

impl<T> PropertyBuilder<T> {
    /// Mark the property as store-backed
    #[must_use]
    pub fn managed(mut self) -> Self {
        self.descriptor = self.descriptor.managed();
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.descriptor = self.descriptor.default_value(value);
        self
    }

    /// Read `null` rather than the zero value when nothing is stored
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.descriptor = self.descriptor.nullable();
        self
    }

    #[must_use]
    pub fn read(mut self, read: ReadFn<T>) -> Self {
        self.read = Some(read);
        self
    }

    #[must_use]
    pub fn write(mut self, write: WriteFn<T>) -> Self {
        self.write = Some(write);
        self
    }

    /// Visibility of both accessors
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.read_visibility = visibility;
        self.write_visibility = visibility;
        self
    }

    #[must_use]
    pub fn read_visibility(mut self, visibility: Visibility) -> Self {
        self.read_visibility = visibility;
        self
    }

    #[must_use]
    pub fn write_visibility(mut self, visibility: Visibility) -> Self {
        self.write_visibility = visibility;
        self
    }

    /// Accessors are bound statically and cannot be substituted by a proxy
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.overridable = false;
        self
    }

    /// Add the property to the table and continue with the table builder
    pub fn finish(self) -> PropertyTableBuilder<T> {
        let read = self
            .read
            .map(|_| Accessor::new(self.read_visibility, self.overridable));
        let write = self
            .write
            .map(|_| Accessor::new(self.write_visibility, self.overridable));
        let descriptor = self.descriptor.read_accessor(read).write_accessor(write);

        let mut table = self.table;
        table.entries.push(PropertyEntry {
            descriptor: Arc::new(descriptor),
            read: self.read,
            write: self.write,
        });
        table
    }
}

// =============================================================================
// Managed Types
// =============================================================================

/// A type with a static property table
///
/// Implemented by hand or through `#[derive(Settings)]`.
///
/// # Example
///
/// ```rust
/// use managed_settings::{Managed, PropertyTable, ValueType};
/// use serde_json::json;
/// use std::sync::OnceLock;
///
/// #[derive(Default)]
/// struct Window {
///     width: i64,
/// }
///
/// impl Managed for Window {
///     fn properties() -> &'static PropertyTable<Self> {
///         static TABLE: OnceLock<PropertyTable<Window>> = OnceLock::new();
///         TABLE.get_or_init(|| {
///             PropertyTable::<Window>::builder("app::Window")
///                 .property("width", ValueType::Integer)
///                 .managed()
///                 .default_value(800)
///                 .read(|w| Ok(json!(w.width)))
///                 .write(|w, v| {
///                     w.width = serde_json::from_value(v)?;
///                     Ok(())
///                 })
///                 .finish()
///                 .build()
///         })
///     }
/// }
///
/// assert_eq!(Window::type_name(), "app::Window");
/// ```
pub trait Managed: Sized + 'static {
    /// The descriptor table of this type
    fn properties() -> &'static PropertyTable<Self>;

    /// Fully qualified type name used for setting keys
    fn type_name() -> &'static str {
        Self::properties().type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sample {
        count: i64,
    }

    fn table() -> PropertyTable<Sample> {
        PropertyTable::<Sample>::builder("tests::Sample")
            .property("count", ValueType::Integer)
            .managed()
            .default_value(3)
            .read(|s| Ok(json!(s.count)))
            .write(|s, v| {
                s.count = serde_json::from_value(v)?;
                Ok(())
            })
            .finish()
            .property("label", ValueType::String)
            .read(|_| Ok(json!("sample")))
            .read_visibility(Visibility::Crate)
            .sealed()
            .finish()
            .build()
    }

    #[test]
    fn test_table_lookup() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.type_name(), "tests::Sample");

        let count = table.descriptor("count").unwrap();
        assert!(count.is_managed());
        assert_eq!(count.default(), Some(&json!(3)));
        assert_eq!(count.qualified_name(), "tests::Sample.count");
        assert_eq!(count.read(), Some(Accessor::public()));

        let label = table.descriptor("label").unwrap();
        assert!(!label.is_managed());
        assert_eq!(label.write(), None);
        assert_eq!(
            label.read(),
            Some(Accessor::new(Visibility::Crate, false))
        );

        assert_eq!(table.managed().count(), 1);
        assert!(matches!(
            table.entry("missing"),
            Err(Error::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_entry_accessors() {
        let table = table();
        let mut sample = Sample { count: 1 };

        let entry = table.entry("count").unwrap();
        assert_eq!(entry.read_from(&sample).unwrap(), json!(1));
        entry.write_to(&mut sample, json!(9)).unwrap();
        assert_eq!(sample.count, 9);

        let label = table.entry("label").unwrap();
        assert!(matches!(
            label.write_to(&mut sample, json!("x")),
            Err(Error::MalformedInvocation { .. })
        ));
    }

    #[test]
    fn test_duplicate_property_keeps_first() {
        let table: PropertyTable<Sample> = PropertyTable::builder("tests::Sample")
            .property("count", ValueType::Integer)
            .managed()
            .finish()
            .property("count", ValueType::String)
            .finish()
            .build();

        assert_eq!(table.len(), 1);
        assert!(table.descriptor("count").unwrap().is_managed());
    }

    #[test]
    fn test_descriptor_identity() {
        let a = PropertyDescriptor::new("app::Model", "theme", ValueType::String);
        let b = PropertyDescriptor::new("app::Model", "theme", ValueType::Any).managed();
        let c = PropertyDescriptor::new("app::Other", "theme", ValueType::String);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
