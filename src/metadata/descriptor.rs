use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A type name as declared in source (e.g., `Doctrine\ORM\EntityRepository`)
///
/// PHP resolves class names case-insensitively and tolerates a leading
/// namespace separator, so equality, ordering and hashing use a normalised
/// key while `as_str` keeps the declared spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClassName {
    declared: String,
    key: String,
}

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        let raw: String = name.into();
        let declared = raw.trim_start_matches('\\').to_string();
        let key = declared.to_ascii_lowercase();
        Self { declared, key }
    }

    /// Declared spelling, without a leading `\`
    pub fn as_str(&self) -> &str {
        &self.declared
    }

    /// Normalised lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compare against a raw name without allocating
    pub fn matches(&self, other: &str) -> bool {
        self.key.eq_ignore_ascii_case(other.trim_start_matches('\\'))
    }

    /// Normalise a raw name into its lookup key
    pub fn key_of(name: &str) -> String {
        name.trim_start_matches('\\').to_ascii_lowercase()
    }
}

impl PartialEq for ClassName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ClassName {}

impl Hash for ClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ClassName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> Self {
        name.declared
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declared)
    }
}

/// Argument value of a metadata tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<TagValue>),
    Map(BTreeMap<String, TagValue>),
    Null,
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TagValue::Null)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

/// Arguments of a metadata tag, split into positional and keyed values
///
/// In a snapshot the arguments are either a list (all positional) or a map
/// whose integer keys are positions and whose other keys are names.
/// Positions are kept sparse, so a gap or a huge index costs nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawArguments", into = "RawArguments")]
pub struct TagArguments {
    positional: BTreeMap<usize, TagValue>,
    named: BTreeMap<String, TagValue>,
}

impl TagArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends after the highest position seen so far
    pub fn with_positional(mut self, value: impl Into<TagValue>) -> Self {
        let next = self
            .positional
            .keys()
            .next_back()
            .map_or(0, |last| last.saturating_add(1));
        self.positional.insert(next, value.into());
        self
    }

    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn positional(&self, index: usize) -> Option<&TagValue> {
        self.positional.get(&index)
    }

    pub fn named(&self, key: &str) -> Option<&TagValue> {
        self.named.get(key)
    }

    /// Keyed value if present and non-null, else the positional one
    pub fn named_or_positional(&self, key: &str, index: usize) -> Option<&TagValue> {
        self.named(key)
            .filter(|v| !v.is_null())
            .or_else(|| self.positional(index).filter(|v| !v.is_null()))
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawArguments {
    List(Vec<TagValue>),
    Map(ArgumentMap),
}

/// Map key as written: YAML has real integer keys, JSON only strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ArgumentKey {
    Index(usize),
    Name(String),
    Other(IgnoredAny),
}

/// Map-form arguments in snapshot order
#[derive(Debug, Clone, Default)]
struct ArgumentMap(Vec<(ArgumentKey, TagValue)>);

impl<'de> Deserialize<'de> for ArgumentMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ArgumentMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tag arguments")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ArgumentMap, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<ArgumentKey, TagValue>()? {
                    entries.push(entry);
                }
                Ok(ArgumentMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl Serialize for ArgumentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.0 {
            match key {
                ArgumentKey::Index(index) => map.serialize_entry(index, value)?,
                ArgumentKey::Name(name) => map.serialize_entry(name, value)?,
                ArgumentKey::Other(_) => {}
            }
        }
        map.end()
    }
}

impl From<RawArguments> for TagArguments {
    fn from(raw: RawArguments) -> Self {
        match raw {
            RawArguments::List(values) => Self {
                positional: values.into_iter().enumerate().collect(),
                named: BTreeMap::new(),
            },
            RawArguments::Map(ArgumentMap(entries)) => {
                let mut args = Self::default();
                for (key, value) in entries {
                    match key {
                        ArgumentKey::Index(index) => {
                            args.positional.insert(index, value);
                        }
                        ArgumentKey::Name(name) => match name.parse::<usize>() {
                            Ok(index) => {
                                args.positional.insert(index, value);
                            }
                            Err(_) => {
                                args.named.insert(name, value);
                            }
                        },
                        // Negative, boolean or float keys name no argument
                        ArgumentKey::Other(_) => {}
                    }
                }
                args
            }
        }
    }
}

impl From<TagArguments> for RawArguments {
    fn from(args: TagArguments) -> Self {
        let dense = args.positional.keys().enumerate().all(|(i, index)| i == *index);
        if args.named.is_empty() && dense {
            return RawArguments::List(args.positional.into_values().collect());
        }

        let entries = args
            .positional
            .into_iter()
            .map(|(index, value)| (ArgumentKey::Index(index), value))
            .chain(args.named.into_iter().map(|(name, value)| (ArgumentKey::Name(name), value)))
            .collect();
        RawArguments::Map(ArgumentMap(entries))
    }
}

/// A declarative annotation (PHP attribute) attached to a class or method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTag {
    pub name: ClassName,
    #[serde(default)]
    pub arguments: TagArguments,
}

impl MetadataTag {
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            arguments: TagArguments::default(),
        }
    }

    pub fn with_arguments(mut self, arguments: TagArguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.matches(name)
    }
}

/// Kind of declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Enum => "enum",
        }
    }
}

/// A method as declared in its class
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMetadata {
    pub name: String,
    pub constructor: bool,
    pub tags: Vec<MetadataTag>,
}

impl MethodMetadata {
    /// Constructor flag is inferred from the PHP `__construct` name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let constructor = name.eq_ignore_ascii_case("__construct");
        Self {
            name,
            constructor,
            tags: Vec::new(),
        }
    }

    pub fn with_constructor(mut self, constructor: bool) -> Self {
        self.constructor = constructor;
        self
    }

    pub fn with_tag(mut self, tag: MetadataTag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// Immutable snapshot of a declared type and what it inherits
///
/// `ancestors` lists parent classes nearest first. `interfaces` is
/// transitive over ancestors and interface inheritance. Names of vendor
/// types missing from the snapshot are still recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    name: ClassName,
    kind: ClassKind,
    ancestors: Vec<ClassName>,
    interfaces: BTreeSet<ClassName>,
    tags: Vec<MetadataTag>,
    methods: Vec<MethodMetadata>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::default(),
            ancestors: Vec::new(),
            interfaces: BTreeSet::new(),
            tags: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_ancestor(mut self, ancestor: impl Into<ClassName>) -> Self {
        self.ancestors.push(ancestor.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<ClassName>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    pub fn with_tag(mut self, tag: MetadataTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn ancestors(&self) -> &[ClassName] {
        &self.ancestors
    }

    pub fn implements_interface(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i.matches(interface))
    }

    /// Strict: a class is never its own subclass
    pub fn is_subclass_of(&self, class: &str) -> bool {
        self.ancestors.iter().any(|a| a.matches(class))
    }

    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetadataTag> + 'a {
        self.tags.iter().filter(move |t| t.is(name))
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDescriptor<'_>> {
        self.methods.iter().map(move |method| MethodDescriptor { class: self, method })
    }

    /// Method names are matched exactly
    pub fn method(&self, name: &str) -> Option<MethodDescriptor<'_>> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .map(|method| MethodDescriptor { class: self, method })
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Borrowed view of one method together with its declaring class
#[derive(Debug, Clone, Copy)]
pub struct MethodDescriptor<'a> {
    class: &'a ClassDescriptor,
    method: &'a MethodMetadata,
}

impl<'a> MethodDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.method.name
    }

    pub fn is_constructor(&self) -> bool {
        self.method.constructor
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.method.tags.iter().any(|t| t.is(name))
    }

    pub fn declaring_class(&self) -> &'a ClassDescriptor {
        self.class
    }

    /// `Class::method`, as analyzers print members
    pub fn display(&self) -> String {
        format!("{}::{}", self.class.name, self.method.name)
    }
}
