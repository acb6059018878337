#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, collections::BTreeSet};

use crate::annotation::Location;

/// One component of a file path in the location tree.
///
/// Folders only hold children and files only hold locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathSegment {
    /// A directory.
    Folder {
        /// Directory name.
        name:     String,
        /// Nested folders and files.
        children: Vec<PathSegment>,
    },
    /// A file.
    File {
        /// File name including its extension.
        name:      String,
        /// Every location reported in this file.
        locations: BTreeSet<Location>,
    },
}

impl PathSegment {
    /// Builds the chain of segments leading to `location`'s file.
    pub(crate) fn from_location(location: &Location) -> Self {
        let mut components = location
            .file_path()
            .split('/')
            .filter(|component| !component.is_empty())
            .collect::<Vec<_>>();
        let file_name = components.pop().unwrap_or_default();

        let mut segment = PathSegment::File {
            name:      file_name.to_string(),
            locations: BTreeSet::from([location.clone()]),
        };
        for folder in components.into_iter().rev() {
            segment = PathSegment::Folder {
                name:     folder.to_string(),
                children: vec![segment],
            };
        }
        segment
    }

    /// Builds a sorted forest with one leaf per distinct file.
    pub(crate) fn forest<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Vec<Self> {
        let mut forest = Vec::new();
        for location in locations {
            Self::splice(&mut forest, Self::from_location(location));
        }
        sort_forest(&mut forest);
        forest
    }

    /// Merges `segment` into the sibling of the same name and kind, or adds
    /// it as a new sibling.
    fn splice(siblings: &mut Vec<Self>, segment: Self) {
        let existing = siblings.iter().position(|sibling| {
            sibling.is_folder() == segment.is_folder() && sibling.name() == segment.name()
        });
        let Some(index) = existing else {
            siblings.push(segment);
            return;
        };

        match (&mut siblings[index], segment) {
            (
                PathSegment::Folder { children, .. },
                PathSegment::Folder {
                    children: incoming, ..
                },
            ) => {
                for child in incoming {
                    Self::splice(children, child);
                }
            }
            (
                PathSegment::File { locations, .. },
                PathSegment::File {
                    locations: incoming,
                    ..
                },
            ) => locations.extend(incoming),
            // `position` only matches segments of the same kind.
            _ => {}
        }
    }

    /// Returns the folder or file name.
    pub(crate) fn name(&self) -> &str {
        match self {
            PathSegment::Folder { name, .. } | PathSegment::File { name, .. } => name,
        }
    }

    /// Returns whether this is a folder.
    pub(crate) fn is_folder(&self) -> bool {
        matches!(self, PathSegment::Folder { .. })
    }
}

/// Sorts every level of the forest, children before their parents.
fn sort_forest(forest: &mut [PathSegment]) {
    for segment in forest.iter_mut() {
        if let PathSegment::Folder { children, .. } = segment {
            sort_forest(children);
        }
    }
    forest.sort();
}

impl Ord for PathSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                PathSegment::Folder { name, children },
                PathSegment::Folder {
                    name: other_name,
                    children: other_children,
                },
            ) => name.cmp(other_name).then_with(|| children.cmp(other_children)),
            (
                PathSegment::File { name, locations },
                PathSegment::File {
                    name: other_name,
                    locations: other_locations,
                },
            ) => name
                .cmp(other_name)
                .then_with(|| locations.cmp(other_locations)),
            (PathSegment::File { name, .. }, PathSegment::Folder { name: other_name, .. }) => {
                name.cmp(other_name).then(Ordering::Less)
            }
            (PathSegment::Folder { name, .. }, PathSegment::File { name: other_name, .. }) => {
                name.cmp(other_name).then(Ordering::Greater)
            }
        }
    }
}

impl PartialOrd for PathSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
