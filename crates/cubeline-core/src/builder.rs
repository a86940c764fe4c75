//! Streaming hierarchy construction from sorted flat records
//!
//! Each record is mapped to a level path (outermost grouping level first, leaf
//! last) by a list of extractors. The builder only remembers the identifier of
//! the current node at each level, so input and output never have to be held
//! in a lookup table.
//!
//! Records must arrive sorted by their level path. An unsorted stream is not
//! detected here; it produces repeated branches, which
//! [`Hierarchy::validate`](crate::model::Hierarchy::validate) reports as
//! duplicate elements.

use crate::error::BuildError;
use crate::model::Hierarchy;

/// Identifier and caption of a node as extracted from a record.
///
/// An empty `id` means the level is absent for that record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub caption: String,
}

impl Node {
    pub fn new(id: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            caption: caption.into(),
        }
    }

    /// Node whose caption is its identifier
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            caption: String::new(),
        }
    }
}

type Extractor<R> = Box<dyn Fn(&R) -> Node + Send + Sync>;

/// One grouping level of a hierarchy
pub struct Level<R> {
    name: String,
    optional: bool,
    extract: Extractor<R>,
}

impl<R> Level<R> {
    /// Level that every record must populate
    pub fn required(
        name: impl Into<String>,
        extract: impl Fn(&R) -> Node + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            optional: false,
            extract: Box::new(extract),
        }
    }

    /// Level that may be empty; children then attach to the nearest
    /// populated ancestor
    pub fn optional(
        name: impl Into<String>,
        extract: impl Fn(&R) -> Node + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            optional: true,
            extract: Box::new(extract),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Grows one [`Hierarchy`] from an ordered record stream.
pub struct HierarchyBuilder<R> {
    hierarchy: Hierarchy,
    root: String,
    levels: Vec<Level<R>>,
    leaf: Extractor<R>,
    /// Identifier of the current node per level; `None` = not seen or skipped
    current: Vec<Option<String>>,
    records: usize,
}

impl<R> HierarchyBuilder<R> {
    /// Create a builder seeded with `root`.
    ///
    /// `levels` are the grouping levels from outermost to innermost; `leaf`
    /// yields the node created for every record.
    pub fn new(
        name: impl Into<String>,
        root: Node,
        levels: Vec<Level<R>>,
        leaf: impl Fn(&R) -> Node + Send + Sync + 'static,
    ) -> Self {
        let mut hierarchy = Hierarchy::new(name);
        hierarchy.add_element(root.id.clone(), &root.caption);
        let current = vec![None; levels.len()];
        Self {
            hierarchy,
            root: root.id,
            levels,
            leaf: Box::new(leaf),
            current,
            records: 0,
        }
    }

    /// Place one record into the hierarchy.
    pub fn push(&mut self, record: &R) -> Result<(), BuildError> {
        self.records += 1;
        let mut parent = self.root.clone();
        // Set once a level opens a new branch; every deeper level is then re-created
        let mut diverged = false;

        for (depth, level) in self.levels.iter().enumerate() {
            let node = (level.extract)(record);
            if node.id.is_empty() {
                if !level.optional {
                    return Err(BuildError::EmptyLevel {
                        hierarchy: self.hierarchy.name().to_string(),
                        level: level.name.clone(),
                        record: self.records,
                    });
                }
                // populated -> empty is a branch change too
                if self.current[depth].take().is_some() {
                    diverged = true;
                }
                continue;
            }

            if !diverged && self.current[depth].as_deref() == Some(node.id.as_str()) {
                parent = node.id;
                continue;
            }

            diverged = true;
            self.hierarchy.add_element(node.id.clone(), &node.caption);
            self.hierarchy.add_edge(parent, node.id.clone());
            parent = node.id.clone();
            self.current[depth] = Some(node.id);
        }

        let leaf = (self.leaf)(record);
        if leaf.id.is_empty() {
            return Err(BuildError::EmptyLeaf {
                hierarchy: self.hierarchy.name().to_string(),
                record: self.records,
            });
        }
        self.hierarchy.add_element(leaf.id.clone(), &leaf.caption);
        self.hierarchy.add_edge(parent, leaf.id);
        Ok(())
    }

    /// Place every record of `records`, in order.
    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a R>) -> Result<(), BuildError>
    where
        R: 'a,
    {
        records.into_iter().try_for_each(|r| self.push(r))
    }

    /// Number of records pushed so far
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Drop the per-level state and hand over the hierarchy
    pub fn finish(self) -> Hierarchy {
        log::debug!(
            "hierarchy '{}': {} records -> {} elements, {} edges",
            self.hierarchy.name(),
            self.records,
            self.hierarchy.len(),
            self.hierarchy.edges().len()
        );
        self.hierarchy
    }
}
