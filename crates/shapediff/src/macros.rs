//! Declarative implementations of [`Diffable`](crate::Diffable).

/// Implement [`Diffable`](crate::Diffable) for a struct as a record.
///
/// List the fields that take part, in declaration order, each optionally
/// followed by its diff directive:
///
/// ```
/// use shapediff::diffable_record;
///
/// struct Item {
///     name: String,
///     value: i64,
///     cached: bool,
/// }
///
/// diffable_record!(Item {
///     name: "name,identifier",
///     value,
///     cached: "-",
/// });
///
/// let old = vec![Item { name: "one".into(), value: 1, cached: false }];
/// let new = vec![Item { name: "one".into(), value: 50, cached: true }];
/// let changes = shapediff::diff(&old, &new).unwrap();
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes.changes[0].path.segments(), ["one", "value"]);
/// ```
#[macro_export]
macro_rules! diffable_record {
    ($ty:ty { $($field:ident $(: $directive:literal)?),* $(,)? }) => {
        impl $crate::Diffable for $ty {
            fn declared_shape() -> $crate::Shape {
                $crate::Shape::record::<$ty>()
            }

            fn shape(&self) -> $crate::Shape {
                $crate::Shape::record::<$ty>()
            }

            fn node(&self) -> $crate::Node<'_> {
                const FIELDS: &[$crate::FieldSpec] = &[
                    $(
                        $crate::FieldSpec {
                            name: stringify!($field),
                            directive: $crate::__diff_directive!($($directive)?),
                        },
                    )*
                ];
                $crate::Node::Record($crate::RecordNode::new(
                    self,
                    FIELDS,
                    vec![$(&self.$field as &dyn $crate::Diffable),*],
                ))
            }
        }
    };
}

/// Implement [`Diffable`](crate::Diffable) for a type compared by equality
/// as a single leaf value.
///
/// ```
/// use shapediff::{diffable_scalar, Value};
///
/// #[derive(PartialEq)]
/// struct Version(u32, u32);
///
/// diffable_scalar!(Version, |v| format!("{}.{}", v.0, v.1));
///
/// let changes = shapediff::diff(&Version(1, 2), &Version(1, 3)).unwrap();
/// assert_eq!(changes.changes[0].to, Value::from("1.3"));
/// ```
#[macro_export]
macro_rules! diffable_scalar {
    ($ty:ty, |$v:ident| $conv:expr) => {
        impl $crate::Diffable for $ty {
            fn declared_shape() -> $crate::Shape {
                $crate::Shape::scalar::<$ty>()
            }

            fn shape(&self) -> $crate::Shape {
                $crate::Shape::scalar::<$ty>()
            }

            fn node(&self) -> $crate::Node<'_> {
                let $v = self;
                $crate::Node::Scalar($crate::Value::from($conv))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __diff_directive {
    () => {
        ::core::option::Option::None
    };
    ($directive:literal) => {
        ::core::option::Option::Some($directive)
    };
}
