use crate::core::record::{Record, SourceSpan};
use crate::core::types::SourceTag;

/// An ordered shard of a collection with a stable index
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    index: usize,
    items: Vec<T>,
}

impl<T> Partition<T> {
    pub fn new(index: usize, items: Vec<T>) -> Self {
        Self { index, items }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// An ordered sequence of partitions.
///
/// The total number of items is deliberately not cached: whole-collection scalars go
/// through [`crate::engine::coordinator`], which is the synchronization point.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    partitions: Vec<Partition<T>>,
}

impl<T> Collection<T> {
    /// Build a collection from per-partition item lists; partition `i` gets index `i`
    pub fn from_partitions(partitions: Vec<Vec<T>>) -> Self {
        Self {
            partitions: partitions
                .into_iter()
                .enumerate()
                .map(|(index, items)| Partition::new(index, items))
                .collect(),
        }
    }

    /// A collection with no partitions
    #[must_use]
    pub fn empty() -> Self {
        Self {
            partitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn partitions(&self) -> &[Partition<T>] {
        &self.partitions
    }

    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Items in global ordinal order (partition by partition)
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flat_map(|p| p.items.iter())
    }

    pub fn into_partitions(self) -> Vec<Partition<T>> {
        self.partitions
    }

    /// Flatten into a single vector in global ordinal order
    pub fn into_vec(self) -> Vec<T> {
        self.partitions
            .into_iter()
            .flat_map(Partition::into_items)
            .collect()
    }
}

/// A record tagged with the input it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    pub source: SourceTag,
    pub record: Record,
}

impl Tagged {
    pub fn new(source: SourceTag, record: Record) -> Self {
        Self { source, record }
    }
}

/// A record with its position in the raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub span: SourceSpan,
    pub record: Record,
}
