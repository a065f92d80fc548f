//! A C# type-name grammar built with `descent`.
//!
//! ```
//! use descent_csharp::{CSharpGrammar, TypeRef};
//!
//! let grammar = CSharpGrammar::new().unwrap();
//! let ty = grammar.parse_type("Dictionary<string, (int key, int value)>[]").unwrap();
//! assert!(matches!(ty, TypeRef::Array(_)));
//! assert_eq!(ty.to_string(), "Dictionary<string, (int key, int value)>[]");
//! ```

pub mod ast;
mod grammar;

pub use crate::{
    ast::{
        GenericArgument, Identifier, NamespacedName, TupleElement, TypeRef, UsingDirective,
        Variance,
    },
    grammar::CSharpGrammar,
};
