//! Skeleton: a validated, arena-indexed bone tree.
//!
//! Bones live in one ordered array whose positions are the stable bone
//! indices used everywhere else (palette texel layout, vertex bone indices).
//! Parent links are plain indices into the same array; child lists and
//! hierarchy paths are derived at construction, after the tree shape has
//! been validated. A malformed tree never produces a `Skeleton` value, so
//! the samplers and the compositor can index freely.

use glam::Mat4;
use smallvec::SmallVec;

use crate::errors::{BakeError, Result};

/// A single bone of a [`Skeleton`].
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone; `None` for the root.
    pub parent: Option<usize>,
    /// Slash-joined names from the root to this bone, exclusive of the root
    /// itself. The root's path is its bare name.
    pub path: String,
    /// Inverse of this bone's bind-pose world transform.
    pub inverse_bind: Mat4,
}

/// Construction input for one bone, before paths and children are derived.
#[derive(Debug, Clone)]
pub struct BoneDesc {
    pub name: String,
    pub parent: Option<usize>,
    pub inverse_bind: Mat4,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    bones: Vec<Bone>,
    children: Vec<SmallVec<[usize; 4]>>,
    root: usize,
}

impl Skeleton {
    /// Builds a skeleton from per-bone descriptions in index order.
    ///
    /// Rejects (with [`BakeError::MalformedSkeleton`]) empty bone lists,
    /// out-of-range or self-referential parents, zero or multiple roots, and
    /// bones unreachable from the root (which also covers cycles).
    pub fn new(name: &str, descs: Vec<BoneDesc>) -> Result<Self> {
        if descs.is_empty() {
            return Err(BakeError::MalformedSkeleton(format!(
                "skeleton '{name}' has no bones"
            )));
        }

        let count = descs.len();
        let mut root = None;
        let mut children: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); count];

        for (i, desc) in descs.iter().enumerate() {
            match desc.parent {
                None => {
                    if let Some(prev) = root {
                        return Err(BakeError::MalformedSkeleton(format!(
                            "bones {prev} and {i} are both roots"
                        )));
                    }
                    root = Some(i);
                }
                Some(p) => {
                    if p >= count || p == i {
                        return Err(BakeError::MalformedSkeleton(format!(
                            "bone {i} ('{}') has invalid parent index {p}",
                            desc.name
                        )));
                    }
                    children[p].push(i);
                }
            }
        }

        let Some(root) = root else {
            return Err(BakeError::MalformedSkeleton(format!(
                "skeleton '{name}' has no root bone"
            )));
        };

        // Derive hierarchy paths top-down and verify reachability in the
        // same traversal.
        let mut paths: Vec<Option<String>> = vec![None; count];
        let mut stack = vec![root];
        let mut visited = 0usize;
        while let Some(bone) = stack.pop() {
            let path = match descs[bone].parent {
                // Root path is the bare name; its children restart the
                // root-exclusive chain.
                None => descs[bone].name.clone(),
                Some(p) if p == root => descs[bone].name.clone(),
                Some(p) => {
                    let parent_path = paths[p].as_deref().unwrap_or("");
                    format!("{parent_path}/{}", descs[bone].name)
                }
            };
            paths[bone] = Some(path);
            visited += 1;
            stack.extend(children[bone].iter().copied());
        }

        if visited != count {
            return Err(BakeError::MalformedSkeleton(format!(
                "{} of {count} bones are not reachable from the root",
                count - visited
            )));
        }

        let bones = descs
            .into_iter()
            .zip(&mut paths)
            .map(|(desc, path)| Bone {
                name: desc.name,
                parent: desc.parent,
                path: path.take().unwrap_or_default(),
                inverse_bind: desc.inverse_bind,
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            bones,
            children,
            root,
        })
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn children(&self, bone: usize) -> &[usize] {
        &self.children[bone]
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind(&self, bone: usize) -> Mat4 {
        self.bones[bone].inverse_bind
    }
}
