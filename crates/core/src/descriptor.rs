//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is the negotiation's view of a Rust type: its [`TypeId`], its name and
//! whether it is text, a homogeneous sequence, or a model. Model descriptors carry a lineage of
//! embedded parent types, which is how "assignable from" is answered without inheritance.

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::warn;

/// Guards lineage walks against accidental cycles.
const MAX_LINEAGE_DEPTH: usize = 16;

/// Accessor that borrows the elements of a type-erased sequence.
pub type ElementsFn = fn(&dyn Any) -> Option<Vec<&dyn Any>>;

/// Types that can describe themselves to the negotiation dispatcher.
///
/// Implemented here for text, sequence and primitive types. Model types get it from
/// `#[verneg_derive::versioned_model]` or a one-line manual impl:
///
/// ```rust
/// use verneg_core::{Describe, TypeDescriptor};
///
/// struct Widget;
///
/// impl Describe for Widget {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::opaque::<Self>()
///     }
/// }
/// ```
pub trait Describe: 'static {
    fn describe() -> TypeDescriptor;
}

/// How the dispatcher should look at a type.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// Character strings. Never decomposed into elements.
    Text,
    /// A homogeneous sequence of some element type.
    Sequence(SequenceKind),
    /// Anything else, with the parent types it can stand in for.
    Model { lineage: fn() -> Vec<Upcast> },
}

/// Element type and element accessor of a sequence type.
#[derive(Clone, Copy)]
pub struct SequenceKind {
    element: fn() -> TypeDescriptor,
    elements: ElementsFn,
}

impl SequenceKind {
    #[must_use]
    pub fn element(&self) -> TypeDescriptor {
        (self.element)()
    }

    /// Borrows the elements of `value`, or `None` if `value` is not of this sequence type.
    #[must_use]
    pub fn elements<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.elements)(value)
    }
}

impl fmt::Debug for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceKind").field("element", &self.element().name()).finish()
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Sequence(seq) => f.debug_tuple("Sequence").field(seq).finish(),
            Self::Model { lineage } => f.debug_struct("Model").field("lineage", &lineage()).finish(),
        }
    }
}

/// A projection from a model to one of its embedded parent models.
#[derive(Clone, Copy)]
pub struct Upcast {
    target: fn() -> TypeDescriptor,
    cast: fn(&dyn Any) -> Option<&dyn Any>,
}

impl Upcast {
    pub const fn new(
        target: fn() -> TypeDescriptor,
        cast: fn(&dyn Any) -> Option<&dyn Any>,
    ) -> Self {
        Self { target, cast }
    }

    #[must_use]
    pub fn target(&self) -> TypeDescriptor {
        (self.target)()
    }

    #[must_use]
    pub fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.cast)(value)
    }
}

impl fmt::Debug for Upcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Upcast").field(&self.target().name()).finish()
    }
}

/// Identity, name and shape of a type taking part in negotiation.
///
/// Equality and hashing only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Describes `T` through its [`Describe`] impl.
    #[must_use]
    pub fn of<T: Describe>() -> Self {
        T::describe()
    }

    /// A character-string type.
    #[must_use]
    pub fn text<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), kind: TypeKind::Text }
    }

    /// A sequence type `S` of elements `E`.
    #[must_use]
    pub fn sequence<S: 'static, E: Describe>(elements: ElementsFn) -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
            kind: TypeKind::Sequence(SequenceKind { element: E::describe, elements }),
        }
    }

    /// A model type with the given parent lineage.
    #[must_use]
    pub fn model<T: 'static>(lineage: fn() -> Vec<Upcast>) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), kind: TypeKind::Model { lineage } }
    }

    /// A model type without parents.
    #[must_use]
    pub fn opaque<T: 'static>() -> Self {
        Self::model::<T>(Vec::new)
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by [`std::any::type_name`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, TypeKind::Text)
    }

    /// The type name with module paths stripped, e.g. `Vec<PersonV2>`.
    #[must_use]
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut start = 0;
        for (idx, ch) in self.name.char_indices() {
            if matches!(ch, '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '&' | '(' | ')') {
                out.push_str(last_segment(&self.name[start..idx]));
                out.push(ch);
                start = idx + ch.len_utf8();
            }
        }
        out.push_str(last_segment(&self.name[start..]));
        out
    }

    /// Parent types this type can stand in for. Empty for text and sequences.
    #[must_use]
    pub fn lineage(&self) -> Vec<Upcast> {
        match self.kind {
            TypeKind::Model { lineage } => lineage(),
            TypeKind::Text | TypeKind::Sequence(_) => Vec::new(),
        }
    }

    /// Whether a value of type `other` can be used where `self` is expected:
    /// `other` is `self`, or one of its (transitive) lineage parents is.
    #[must_use]
    pub fn is_assignable_from(&self, other: &Self) -> bool {
        self.assignable_within(other, MAX_LINEAGE_DEPTH)
    }

    fn assignable_within(&self, other: &Self, depth: usize) -> bool {
        if self.id == other.id {
            return true;
        }
        let lineage = other.lineage();
        if depth == 0 {
            if !lineage.is_empty() {
                lineage_exhausted(other, self.name);
            }
            return false;
        }
        lineage.iter().any(|parent| self.assignable_within(&parent.target(), depth - 1))
    }
}

fn lineage_exhausted(model: &TypeDescriptor, wanted: &str) {
    warn!(
        %model,
        %wanted,
        max_depth = MAX_LINEAGE_DEPTH,
        "Lineage walk ran out of depth; check `extends` for cycles or overly deep chains"
    );
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TypeKind::Text => "text",
            TypeKind::Sequence(_) => "sequence",
            TypeKind::Model { .. } => "model",
        };
        f.debug_struct("TypeDescriptor").field("name", &self.name).field("kind", &kind).finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A borrowed model instance together with its runtime descriptor.
#[derive(Clone, Copy)]
pub struct ModelRef<'a> {
    value: &'a dyn Any,
    ty: TypeDescriptor,
}

impl<'a> ModelRef<'a> {
    pub const fn new(value: &'a dyn Any, ty: TypeDescriptor) -> Self {
        Self { value, ty }
    }

    pub fn of<T: Describe>(value: &'a T) -> Self {
        Self { value, ty: T::describe() }
    }

    #[must_use]
    pub const fn type_descriptor(&self) -> TypeDescriptor {
        self.ty
    }

    /// Views the model as `M`, following the lineage when the runtime type is a child of `M`.
    #[must_use]
    pub fn downcast<M: 'static>(&self) -> Option<&'a M> {
        self.downcast_within(MAX_LINEAGE_DEPTH)
    }

    fn downcast_within<M: 'static>(&self, depth: usize) -> Option<&'a M> {
        if let Some(model) = self.value.downcast_ref::<M>() {
            return Some(model);
        }
        let lineage = self.ty.lineage();
        if depth == 0 {
            if !lineage.is_empty() {
                lineage_exhausted(&self.ty, type_name::<M>());
            }
            return None;
        }
        lineage.into_iter().find_map(|parent| {
            let value = parent.apply(self.value)?;
            Self { value, ty: parent.target() }.downcast_within(depth - 1)
        })
    }
}

impl fmt::Debug for ModelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.ty.name).finish()
    }
}

macro_rules! describe_text {
    ($($ty:ty),* $(,)?) => {
        $(impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::text::<Self>()
            }
        })*
    };
}

macro_rules! describe_opaque {
    ($($ty:ty),* $(,)?) => {
        $(impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::opaque::<Self>()
            }
        })*
    };
}

describe_text!(String, &'static str, Cow<'static, str>, Box<str>, Arc<str>);

describe_opaque!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    serde_json::Value,
);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<Self, T>(|value| {
            value.downcast_ref::<Self>().map(|items| items.iter().map(|i| i as &dyn Any).collect())
        })
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<Self, T>(|value| {
            value.downcast_ref::<Self>().map(|items| items.iter().map(|i| i as &dyn Any).collect())
        })
    }
}

impl<T: Describe> Describe for Box<[T]> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<Self, T>(|value| {
            value.downcast_ref::<Self>().map(|items| items.iter().map(|i| i as &dyn Any).collect())
        })
    }
}

impl<T: Describe> Describe for Arc<[T]> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<Self, T>(|value| {
            value.downcast_ref::<Self>().map(|items| items.iter().map(|i| i as &dyn Any).collect())
        })
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence::<Self, T>(|value| {
            value.downcast_ref::<Self>().map(|items| items.iter().map(|i| i as &dyn Any).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Debug)]
    struct Base(u32);

    #[derive(Debug)]
    struct Child {
        base: Base,
    }

    #[derive(Debug)]
    struct GrandChild {
        child: Child,
    }

    impl Describe for Base {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::opaque::<Self>()
        }
    }

    impl Describe for Child {
        fn describe() -> TypeDescriptor {
            fn lineage() -> Vec<Upcast> {
                vec![Upcast::new(Base::describe, |v| {
                    v.downcast_ref::<Child>().map(|c| &c.base as &dyn Any)
                })]
            }
            TypeDescriptor::model::<Self>(lineage)
        }
    }

    impl Describe for GrandChild {
        fn describe() -> TypeDescriptor {
            fn lineage() -> Vec<Upcast> {
                vec![Upcast::new(Child::describe, |v| {
                    v.downcast_ref::<GrandChild>().map(|g| &g.child as &dyn Any)
                })]
            }
            TypeDescriptor::model::<Self>(lineage)
        }
    }

    #[derive(Debug)]
    struct Ouroboros;

    impl Describe for Ouroboros {
        fn describe() -> TypeDescriptor {
            fn lineage() -> Vec<Upcast> {
                vec![Upcast::new(Ouroboros::describe, |v| Some(v))]
            }
            TypeDescriptor::model::<Self>(lineage)
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt().with_writer(captured.clone()).finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.contents()
    }

    #[test]
    fn cyclic_lineage_stops_and_warns() {
        let base = TypeDescriptor::of::<Base>();
        let cycle = TypeDescriptor::of::<Ouroboros>();

        let logs = capture_logs(|| assert!(!base.is_assignable_from(&cycle)));
        assert!(logs.contains("Lineage walk ran out of depth"), "{logs}");
        assert!(logs.contains("WARN"), "{logs}");

        let logs = capture_logs(|| assert!(ModelRef::of(&Ouroboros).downcast::<Base>().is_none()));
        assert!(logs.contains("Lineage walk ran out of depth"), "{logs}");
    }

    #[test]
    fn finite_lineage_does_not_warn() {
        let base = TypeDescriptor::of::<Base>();
        let logs = capture_logs(|| {
            assert!(!TypeDescriptor::of::<GrandChild>().is_assignable_from(&base));
            assert!(base.is_assignable_from(&TypeDescriptor::of::<GrandChild>()));
        });
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn text_types_are_text() {
        assert!(TypeDescriptor::of::<String>().is_text());
        assert!(TypeDescriptor::of::<&'static str>().is_text());
        assert!(!TypeDescriptor::of::<u32>().is_text());
    }

    #[test]
    fn sequences_expose_their_element() {
        let ty = TypeDescriptor::of::<Vec<Base>>();
        let TypeKind::Sequence(seq) = ty.kind() else {
            panic!("Vec must describe as a sequence");
        };
        assert_eq!(seq.element(), TypeDescriptor::of::<Base>());

        let value = vec![Base(1), Base(2)];
        let items = seq.elements(&value).expect("elements of a matching value");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].downcast_ref::<Base>().map(|b| b.0), Some(2));

        assert!(seq.elements(&Base(3)).is_none());
    }

    #[test]
    fn assignability_follows_lineage() {
        let base = TypeDescriptor::of::<Base>();
        let child = TypeDescriptor::of::<Child>();
        let grand = TypeDescriptor::of::<GrandChild>();

        assert!(base.is_assignable_from(&base));
        assert!(base.is_assignable_from(&child));
        assert!(base.is_assignable_from(&grand));
        assert!(child.is_assignable_from(&grand));
        assert!(!child.is_assignable_from(&base));
        assert!(!grand.is_assignable_from(&child));
    }

    #[test]
    fn model_ref_downcasts_through_lineage() {
        let value = GrandChild { child: Child { base: Base(7) } };
        let model = ModelRef::of(&value);

        assert_eq!(model.downcast::<Base>().map(|b| b.0), Some(7));
        assert!(model.downcast::<Child>().is_some());
        assert!(model.downcast::<String>().is_none());
    }

    #[test]
    fn short_name_strips_module_paths() {
        assert_eq!(TypeDescriptor::of::<Vec<Base>>().short_name(), "Vec<Base>");
        assert_eq!(TypeDescriptor::of::<[Child; 2]>().short_name(), "[Child; 2]");
        assert_eq!(TypeDescriptor::of::<String>().short_name(), "String");
    }
}
