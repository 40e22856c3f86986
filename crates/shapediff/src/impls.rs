//! [`Diffable`] for standard library types.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use shapediff_types::Value;

use crate::diffable::{Diffable, MapKey, Node, Shape};

macro_rules! scalar_impls {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl Diffable for $ty {
                fn declared_shape() -> Shape {
                    Shape::scalar::<$ty>()
                }

                fn shape(&self) -> Shape {
                    Shape::scalar::<$ty>()
                }

                fn node(&self) -> Node<'_> {
                    let $v = self;
                    Node::Scalar($conv)
                }
            }
        )*
    };
}

scalar_impls! {
    bool => |v| Value::Bool(*v),
    i8 => |v| Value::Int(i64::from(*v)),
    i16 => |v| Value::Int(i64::from(*v)),
    i32 => |v| Value::Int(i64::from(*v)),
    i64 => |v| Value::Int(*v),
    isize => |v| Value::Int(*v as i64),
    u8 => |v| Value::UInt(u64::from(*v)),
    u16 => |v| Value::UInt(u64::from(*v)),
    u32 => |v| Value::UInt(u64::from(*v)),
    u64 => |v| Value::UInt(*v),
    usize => |v| Value::UInt(*v as u64),
    f32 => |v| Value::Float(f64::from(*v)),
    f64 => |v| Value::Float(*v),
    char => |v| Value::Char(*v),
    String => |v| Value::Str(v.clone()),
    &'static str => |v| Value::Str((*v).to_owned()),
}

macro_rules! map_key_impls {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MapKey for $ty {
                fn key_segment(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

map_key_impls!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    char,
    String,
    &'static str,
);

impl<T: Diffable> Diffable for Option<T> {
    fn declared_shape() -> Shape {
        Shape::optional(T::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Optional(self.as_ref().map(|v| v as &dyn Diffable))
    }
}

// Owning pointers are transparent: they compare as their pointee.
macro_rules! pointer_impls {
    ($($ptr:ident),*) => {
        $(
            impl<T: Diffable> Diffable for $ptr<T> {
                fn declared_shape() -> Shape {
                    T::declared_shape()
                }

                fn shape(&self) -> Shape {
                    (**self).shape()
                }

                fn node(&self) -> Node<'_> {
                    (**self).node()
                }
            }
        )*
    };
}

pointer_impls!(Box, Rc, Arc);

impl<T: Diffable> Diffable for Vec<T> {
    fn declared_shape() -> Shape {
        Shape::sequence(T::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Sequence(self.iter().map(|v| v as &dyn Diffable).collect())
    }
}

impl<T: Diffable> Diffable for VecDeque<T> {
    fn declared_shape() -> Shape {
        Shape::sequence(T::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Sequence(self.iter().map(|v| v as &dyn Diffable).collect())
    }
}

impl<T: Diffable, const N: usize> Diffable for [T; N] {
    fn declared_shape() -> Shape {
        Shape::sequence(T::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Sequence(self.iter().map(|v| v as &dyn Diffable).collect())
    }
}

impl<K: MapKey + Diffable, V: Diffable> Diffable for BTreeMap<K, V> {
    fn declared_shape() -> Shape {
        Shape::mapping(K::declared_shape(), V::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Mapping(
            self.iter()
                .map(|(k, v)| (k.key_segment(), v as &dyn Diffable))
                .collect(),
        )
    }
}

impl<K: MapKey + Diffable, V: Diffable, S: BuildHasher> Diffable for HashMap<K, V, S> {
    fn declared_shape() -> Shape {
        Shape::mapping(K::declared_shape(), V::declared_shape())
    }

    fn shape(&self) -> Shape {
        Self::declared_shape()
    }

    fn node(&self) -> Node<'_> {
        Node::Mapping(
            self.iter()
                .map(|(k, v)| (k.key_segment(), v as &dyn Diffable))
                .collect(),
        )
    }
}
