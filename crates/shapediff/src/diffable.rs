//! The category model every comparable type maps onto.
//!
//! A type takes part in a comparison by implementing [`Diffable`]: it reports
//! its declared [`Shape`] and exposes its contents as a [`Node`] in one of a
//! small, closed set of categories (scalar, optional, sequence, mapping,
//! record). The walker dispatches on those categories only; it never
//! inspects concrete types.
//!
//! Records are normally implemented with [`diffable_record!`](crate::diffable_record)
//! and equality-compared leaves with [`diffable_scalar!`](crate::diffable_scalar).

use std::any::{type_name, TypeId};
use std::fmt;

use shapediff_types::Value;

/// A value the comparison engine can walk.
pub trait Diffable {
    /// The shape every value of this type has.
    fn declared_shape() -> Shape
    where
        Self: Sized;

    /// The shape of this particular value. Equal to [`Diffable::declared_shape`]
    /// for every statically typed implementation; type-erased wrappers such as
    /// [`Dynamic`] report the shape of what they hold.
    fn shape(&self) -> Shape;

    /// The contents of this value, viewed through its category.
    fn node(&self) -> Node<'_>;
}

/// The declared structure of a type. Two values are comparable only when
/// their shapes are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar {
        type_id: TypeId,
        name: &'static str,
    },
    Optional(Box<Shape>),
    Sequence(Box<Shape>),
    Mapping {
        key: Box<Shape>,
        value: Box<Shape>,
    },
    Record {
        type_id: TypeId,
        name: &'static str,
    },
    /// A type-erased slot whose contents are only known per value.
    Dynamic,
}

impl Shape {
    /// The shape of the leaf type `T`.
    pub fn scalar<T: 'static>() -> Self {
        Shape::Scalar {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The shape of the record type `T`.
    pub fn record<T: 'static>() -> Self {
        Shape::Record {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn sequence(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    pub fn mapping(key: Shape, value: Shape) -> Self {
        Shape::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar { name, .. } | Shape::Record { name, .. } => f.write_str(name),
            Shape::Optional(inner) => write!(f, "Option<{inner}>"),
            Shape::Sequence(element) => write!(f, "[{element}]"),
            Shape::Mapping { key, value } => write!(f, "{{{key}: {value}}}"),
            Shape::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// A value seen through its category.
pub enum Node<'a> {
    /// A leaf compared by equality.
    Scalar(Value),
    /// A value that may be absent. `Some` holds the dereferenced content.
    Optional(Option<&'a dyn Diffable>),
    /// An ordered sequence of elements of one shape.
    Sequence(Vec<&'a dyn Diffable>),
    /// Unordered entries keyed by the string form of their keys.
    Mapping(Vec<(String, &'a dyn Diffable)>),
    /// A structured record with a static field list.
    Record(RecordNode<'a>),
    /// A value the engine cannot classify. Comparing one is an error.
    Unsupported(&'static str),
}

impl Node<'_> {
    /// Category name, used in error messages.
    pub fn category(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Optional(_) => "optional",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Record(_) => "record",
            Node::Unsupported(_) => "unsupported",
        }
    }
}

/// Static description of one record field: its declared name and its raw
/// diff directive, if it has one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub directive: Option<&'static str>,
}

/// The contents of a record: its type identity, its static field list and
/// one value per field, in declaration order.
pub struct RecordNode<'a> {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub fields: &'static [FieldSpec],
    pub values: Vec<&'a dyn Diffable>,
    addr: usize,
}

impl<'a> RecordNode<'a> {
    /// Describe the record `this`. `values` must line up with `fields`.
    pub fn new<T: 'static>(
        this: &'a T,
        fields: &'static [FieldSpec],
        values: Vec<&'a dyn Diffable>,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            fields,
            values,
            addr: this as *const T as usize,
        }
    }

    /// Address of the record itself, which together with its type identifies
    /// it on the active comparison path.
    pub(crate) fn identity(&self) -> (usize, TypeId) {
        (self.addr, self.type_id)
    }

    /// The type name without its module path or generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Types that can key a mapping. The key's string form becomes the path
/// segment of changes to that entry.
pub trait MapKey {
    fn key_segment(&self) -> String;
}

/// A type-erased value whose shape is only known at runtime.
///
/// Use it for fields that may hold values of different types. Shapes are
/// compared when the walker reaches the slot, so two slots holding different
/// shapes fail the comparison with a shape mismatch.
pub struct Dynamic(Box<dyn Diffable>);

impl Dynamic {
    pub fn new<T: Diffable + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The wrapped value.
    pub fn get(&self) -> &dyn Diffable {
        self.0.as_ref()
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dynamic({})", self.0.shape())
    }
}

impl Diffable for Dynamic {
    fn declared_shape() -> Shape {
        Shape::Dynamic
    }

    fn shape(&self) -> Shape {
        self.0.shape()
    }

    fn node(&self) -> Node<'_> {
        self.0.node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: i32,
        right: String,
    }

    const PAIR_FIELDS: &[FieldSpec] = &[
        FieldSpec {
            name: "left",
            directive: None,
        },
        FieldSpec {
            name: "right",
            directive: Some("r"),
        },
    ];

    impl Diffable for Pair {
        fn declared_shape() -> Shape {
            Shape::record::<Pair>()
        }

        fn shape(&self) -> Shape {
            Shape::record::<Pair>()
        }

        fn node(&self) -> Node<'_> {
            Node::Record(RecordNode::new(
                self,
                PAIR_FIELDS,
                vec![&self.left as &dyn Diffable, &self.right as &dyn Diffable],
            ))
        }
    }

    #[test]
    fn shapes_compose() {
        let shape = <Vec<Option<i32>>>::declared_shape();
        assert_eq!(shape, Shape::sequence(Shape::optional(Shape::scalar::<i32>())));
        assert_ne!(shape, <Vec<Option<i64>>>::declared_shape());
        assert_eq!(shape.to_string(), "[Option<i32>]");
    }

    #[test]
    fn record_node_exposes_fields_in_order() {
        let pair = Pair {
            left: 1,
            right: "x".into(),
        };
        let Node::Record(record) = pair.node() else {
            panic!("expected a record node");
        };
        assert_eq!(record.values.len(), 2);
        assert_eq!(record.short_name(), "Pair");
        assert_eq!(record.fields[1].directive, Some("r"));
        assert!(matches!(record.values[0].node(), Node::Scalar(Value::Int(1))));
    }

    #[test]
    fn dynamic_reports_inner_shape() {
        let slot = Dynamic::new(5u8);
        assert_eq!(slot.shape(), Shape::scalar::<u8>());
        assert_eq!(Dynamic::declared_shape(), Shape::Dynamic);
        assert_eq!(<Vec<Dynamic>>::declared_shape(), Shape::sequence(Shape::Dynamic));
        assert_eq!(format!("{slot:?}"), "Dynamic(u8)");
    }

    #[test]
    fn category_names() {
        assert_eq!(Node::Scalar(Value::Absent).category(), "scalar");
        assert_eq!(Node::Optional(None).category(), "optional");
        assert_eq!(Node::Unsupported("x").category(), "unsupported");
    }
}
