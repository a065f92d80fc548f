//! Values produced by the grammar.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier(value.to_owned())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dotted name such as `System.Collections.Generic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacedName(pub Vec<Identifier>);

impl NamespacedName {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Identifier::as_str)
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    In,
    Out,
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::In => f.write_str("in"),
            Variance::Out => f.write_str("out"),
        }
    }
}

/// One entry of a `<...>` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericArgument {
    pub variance: Option<Variance>,
    pub ty: TypeRef,
}

/// One entry of a tuple type, with its optional element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub ty: TypeRef,
    pub name: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Name(NamespacedName),
    Generic {
        name: NamespacedName,
        arguments: Vec<GenericArgument>,
    },
    Tuple(Vec<TupleElement>),
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// A plain dotted type name.
    pub fn name<'s>(segments: impl IntoIterator<Item = &'s str>) -> Self {
        TypeRef::Name(NamespacedName(
            segments.into_iter().map(Identifier::from).collect(),
        ))
    }
}

/// Renders in canonical spacing: `a.b<in c, d>[]`, `(int a, string)`.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Name(name) => write!(f, "{name}"),
            TypeRef::Generic { name, arguments } => {
                write!(f, "{name}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(variance) = argument.variance {
                        write!(f, "{variance} ")?;
                    }
                    write!(f, "{}", argument.ty)?;
                }
                f.write_str(">")
            }
            TypeRef::Tuple(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if let Some(name) = &element.name {
                        write!(f, " {name}")?;
                    }
                }
                f.write_str(")")
            }
            TypeRef::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// A `using` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UsingDirective {
    /// `using System.Text;`
    Namespace(NamespacedName),
    /// `using Map = Dictionary<string, int>;`
    Alias { alias: Identifier, target: TypeRef },
}
