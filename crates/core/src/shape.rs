use crate::descriptor::{TypeDescriptor, TypeKind};

/// Whether a response is a single model or a homogeneous collection of models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Scalar { element: TypeDescriptor },
    Collection { element: TypeDescriptor },
}

impl ResponseShape {
    /// The model type mapper lookup is keyed on.
    #[must_use]
    pub const fn element(&self) -> TypeDescriptor {
        match self {
            Self::Scalar { element } | Self::Collection { element } => *element,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }
}

/// Classifies a payload type.
///
/// Text is always a scalar even though it is a sequence of characters, sequences are collections
/// of their element type, and everything else is a scalar of itself.
#[must_use]
pub fn classify(ty: &TypeDescriptor) -> ResponseShape {
    match ty.kind() {
        TypeKind::Sequence(seq) => ResponseShape::Collection { element: seq.element() },
        TypeKind::Text | TypeKind::Model { .. } => ResponseShape::Scalar { element: *ty },
    }
}
