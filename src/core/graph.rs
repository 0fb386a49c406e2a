//! The in-memory manifest object graph.
//!
//! A graph always holds one project, one application target, the group tree
//! (main group, source root group, products group), three build phases and
//! two configuration lists. Source files are added through
//! [`GraphBuilder`](crate::builder::GraphBuilder).
//!
//! Objects are stored in creation order; the serializer emits them in that
//! order.

use std::collections::HashMap;
use std::path::Path;

use crate::core::id::{IdAllocator, IdError, IdSource, ObjectId};
use crate::core::settings::{
    project_settings, target_settings, BuildSettings, ConfigurationKind, ProductSettings,
};

/// Manifest format version written to `objectVersion`.
pub const DEFAULT_OBJECT_VERSION: u32 = 56;

/// Static description of the project being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project and target name
    pub name: String,

    /// Directory (relative to the project root) holding the sources
    pub source_root: String,

    /// `objectVersion` of the written manifest
    pub object_version: u32,

    /// Values for the target's build settings
    pub product: ProductSettings,
}

impl ProjectInfo {
    /// Project named `name` whose sources live in a directory of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        ProjectInfo {
            source_root: name.clone(),
            name,
            object_version: DEFAULT_OBJECT_VERSION,
            product: ProductSettings::default(),
        }
    }

    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = source_root.into();
        self
    }

    /// File name of the built product.
    pub fn product_name(&self) -> String {
        format!("{}.app", self.name)
    }
}

/// What a file reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A source file; carries its `lastKnownFileType`.
    Source(&'static str),
    /// The built application bundle.
    Product,
}

/// `lastKnownFileType` for a source path, chosen by extension.
pub fn file_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "swift" => "sourcecode.swift",
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "c" => "sourcecode.c.c",
        "cpp" | "cc" | "cxx" => "sourcecode.cpp.cpp",
        "h" => "sourcecode.c.h",
        "metal" => "sourcecode.metal",
        _ => "text",
    }
}

/// One file known to the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub id: ObjectId,
    /// Base name, used as the display comment
    pub name: String,
    /// Path relative to the enclosing source root
    pub path: String,
    pub kind: FileKind,
}

/// "This file participates in this build phase."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFile {
    pub id: ObjectId,
    pub file_ref: ObjectId,
    pub file_name: String,
    pub phase: PhaseKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Group,
    File,
}

/// An entry in a group's children list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub id: ObjectId,
    pub name: String,
    pub kind: ChildKind,
}

/// A node of the navigable group tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: ObjectId,
    pub name: Option<String>,
    pub path: Option<String>,
    pub children: Vec<Child>,
}

impl Group {
    /// Name shown for the group, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Frameworks,
    Resources,
}

impl PhaseKind {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseKind::Sources => "Sources",
            PhaseKind::Frameworks => "Frameworks",
            PhaseKind::Resources => "Resources",
        }
    }

    pub fn isa(&self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Frameworks => "PBXFrameworksBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
        }
    }
}

/// An ordered list of build files consumed by one build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPhase {
    pub id: ObjectId,
    pub kind: PhaseKind,
    pub files: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTarget {
    pub id: ObjectId,
    pub name: String,
    pub product_ref: ObjectId,
    pub build_phases: Vec<ObjectId>,
    pub configuration_list: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ObjectId,
    pub main_group: ObjectId,
    pub products_group: ObjectId,
    pub targets: Vec<ObjectId>,
    pub configuration_list: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub id: ObjectId,
    pub kind: ConfigurationKind,
    pub settings: BuildSettings,
}

/// Which object a configuration list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOwner {
    Project,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationList {
    pub id: ObjectId,
    pub owner: ListOwner,
    /// Debug, then Release
    pub configurations: [ObjectId; 2],
    pub default: ConfigurationKind,
}

/// Object counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub build_files: usize,
    pub file_references: usize,
    pub groups: usize,
    pub configurations: usize,
    pub configuration_lists: usize,
}

/// The complete manifest object graph.
#[derive(Debug, Clone)]
pub struct ManifestGraph {
    pub info: ProjectInfo,
    pub project: Project,
    pub target: NativeTarget,
    pub source_group: ObjectId,
    pub groups: Vec<Group>,
    pub file_refs: Vec<FileReference>,
    pub build_files: Vec<BuildFile>,
    pub sources: BuildPhase,
    pub frameworks: BuildPhase,
    pub resources: BuildPhase,
    pub configurations: Vec<BuildConfiguration>,
    pub configuration_lists: Vec<ConfigurationList>,
    group_index: HashMap<ObjectId, usize>,
    file_index: HashMap<ObjectId, usize>,
}

impl ManifestGraph {
    /// Create the fixed scaffold with no source files.
    pub fn scaffold<S: IdSource>(
        info: ProjectInfo,
        ids: &mut IdAllocator<S>,
    ) -> Result<Self, IdError> {
        let project_id = ids.allocate()?;
        let target_id = ids.allocate()?;
        let main_group = ids.allocate()?;
        let source_group = ids.allocate()?;
        let products_group = ids.allocate()?;
        let product_ref = ids.allocate()?;

        let sources = BuildPhase {
            id: ids.allocate()?,
            kind: PhaseKind::Sources,
            files: Vec::new(),
        };
        let frameworks = BuildPhase {
            id: ids.allocate()?,
            kind: PhaseKind::Frameworks,
            files: Vec::new(),
        };
        let resources = BuildPhase {
            id: ids.allocate()?,
            kind: PhaseKind::Resources,
            files: Vec::new(),
        };

        let mut configurations = Vec::with_capacity(4);
        let mut configuration_lists = Vec::with_capacity(2);
        for owner in [ListOwner::Project, ListOwner::Target] {
            let mut pair = [project_id; 2];
            for (slot, kind) in ConfigurationKind::ALL.into_iter().enumerate() {
                let settings = match owner {
                    ListOwner::Project => {
                        project_settings(kind, &info.product.deployment_target)
                    }
                    ListOwner::Target => target_settings(kind, &info.product),
                };
                let id = ids.allocate()?;
                configurations.push(BuildConfiguration { id, kind, settings });
                pair[slot] = id;
            }
            configuration_lists.push(ConfigurationList {
                id: ids.allocate()?,
                owner,
                configurations: pair,
                default: ConfigurationKind::Release,
            });
        }

        let product_name = info.product_name();
        let groups = vec![
            Group {
                id: main_group,
                name: None,
                path: None,
                children: vec![
                    Child {
                        id: source_group,
                        name: info.source_root.clone(),
                        kind: ChildKind::Group,
                    },
                    Child {
                        id: products_group,
                        name: "Products".to_string(),
                        kind: ChildKind::Group,
                    },
                ],
            },
            Group {
                id: source_group,
                name: None,
                path: Some(info.source_root.clone()),
                children: Vec::new(),
            },
            Group {
                id: products_group,
                name: Some("Products".to_string()),
                path: None,
                children: vec![Child {
                    id: product_ref,
                    name: product_name.clone(),
                    kind: ChildKind::File,
                }],
            },
        ];

        let file_refs = vec![FileReference {
            id: product_ref,
            name: product_name.clone(),
            path: product_name,
            kind: FileKind::Product,
        }];

        let project = Project {
            id: project_id,
            main_group,
            products_group,
            targets: vec![target_id],
            configuration_list: configuration_lists[0].id,
        };
        let target = NativeTarget {
            id: target_id,
            name: info.name.clone(),
            product_ref,
            build_phases: vec![sources.id, frameworks.id, resources.id],
            configuration_list: configuration_lists[1].id,
        };

        let mut graph = ManifestGraph {
            info,
            project,
            target,
            source_group,
            groups,
            file_refs,
            build_files: Vec::new(),
            sources,
            frameworks,
            resources,
            configurations,
            configuration_lists,
            group_index: HashMap::new(),
            file_index: HashMap::new(),
        };
        graph.reindex();
        Ok(graph)
    }

    fn reindex(&mut self) {
        self.group_index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id, i))
            .collect();
        self.file_index = self
            .file_refs
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();
    }

    pub fn group(&self, id: ObjectId) -> Option<&Group> {
        self.group_index.get(&id).map(|&i| &self.groups[i])
    }

    fn group_mut(&mut self, id: ObjectId) -> Option<&mut Group> {
        let i = *self.group_index.get(&id)?;
        self.groups.get_mut(i)
    }

    pub fn file_ref(&self, id: ObjectId) -> Option<&FileReference> {
        self.file_index.get(&id).map(|&i| &self.file_refs[i])
    }

    pub fn build_file(&self, id: ObjectId) -> Option<&BuildFile> {
        self.build_files.iter().find(|b| b.id == id)
    }

    pub fn main_group(&self) -> &Group {
        &self.groups[0]
    }

    pub fn phase(&self, kind: PhaseKind) -> &BuildPhase {
        match kind {
            PhaseKind::Sources => &self.sources,
            PhaseKind::Frameworks => &self.frameworks,
            PhaseKind::Resources => &self.resources,
        }
    }

    pub fn configuration(&self, id: ObjectId) -> Option<&BuildConfiguration> {
        self.configurations.iter().find(|c| c.id == id)
    }

    /// Source file references, excluding the product reference.
    pub fn source_files(&self) -> impl Iterator<Item = &FileReference> {
        self.file_refs
            .iter()
            .filter(|f| matches!(f.kind, FileKind::Source(_)))
    }

    /// Create an empty named group under `parent`.
    ///
    /// Returns `None` if `parent` is not a group of this graph.
    pub fn add_group(&mut self, parent: ObjectId, id: ObjectId, name: &str) -> Option<ObjectId> {
        self.group_mut(parent)?.children.push(Child {
            id,
            name: name.to_string(),
            kind: ChildKind::Group,
        });
        self.groups.push(Group {
            id,
            name: Some(name.to_string()),
            path: None,
            children: Vec::new(),
        });
        self.group_index.insert(id, self.groups.len() - 1);
        Some(id)
    }

    /// Attach `file` under `parent`.
    pub fn add_file_reference(&mut self, parent: ObjectId, file: FileReference) -> Option<ObjectId> {
        let id = file.id;
        self.group_mut(parent)?.children.push(Child {
            id,
            name: file.name.clone(),
            kind: ChildKind::File,
        });
        self.file_refs.push(file);
        self.file_index.insert(id, self.file_refs.len() - 1);
        Some(id)
    }

    /// Bind `file_ref` into the Sources phase, appending to its file list.
    pub fn add_source_build_file(&mut self, id: ObjectId, file_ref: ObjectId) -> Option<ObjectId> {
        let file_name = self.file_ref(file_ref)?.name.clone();
        self.build_files.push(BuildFile {
            id,
            file_ref,
            file_name,
            phase: PhaseKind::Sources,
        });
        self.sources.files.push(id);
        Some(id)
    }

    /// Every object identifier in the graph.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids = vec![self.project.id, self.target.id];
        ids.extend(self.groups.iter().map(|g| g.id));
        ids.extend(self.file_refs.iter().map(|f| f.id));
        ids.extend(self.build_files.iter().map(|b| b.id));
        ids.extend([self.sources.id, self.frameworks.id, self.resources.id]);
        ids.extend(self.configurations.iter().map(|c| c.id));
        ids.extend(self.configuration_lists.iter().map(|l| l.id));
        ids
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            build_files: self.build_files.len(),
            file_references: self.file_refs.len(),
            groups: self.groups.len(),
            configurations: self.configurations.len(),
            configuration_lists: self.configuration_lists.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scaffold() -> ManifestGraph {
        ManifestGraph::scaffold(ProjectInfo::new("TripBro"), &mut IdAllocator::new()).unwrap()
    }

    #[test]
    fn test_scaffold_objects() {
        let graph = scaffold();

        assert_eq!(graph.project.targets, vec![graph.target.id]);
        assert_eq!(graph.groups.len(), 3);
        assert_eq!(graph.file_refs.len(), 1);
        assert_eq!(graph.file_refs[0].kind, FileKind::Product);
        assert_eq!(graph.file_refs[0].path, "TripBro.app");
        assert!(graph.build_files.is_empty());
        assert!(graph.sources.files.is_empty());
        assert_eq!(graph.configuration_lists.len(), 2);
        assert_eq!(graph.configurations.len(), 4);
        assert_eq!(
            graph.target.build_phases,
            vec![graph.sources.id, graph.frameworks.id, graph.resources.id]
        );
    }

    #[test]
    fn test_scaffold_ids_are_distinct() {
        let graph = scaffold();
        let ids = graph.object_ids();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_configuration_lists_default_to_release() {
        let graph = scaffold();
        for list in &graph.configuration_lists {
            assert_eq!(list.default, ConfigurationKind::Release);
            let kinds: Vec<_> = list
                .configurations
                .iter()
                .map(|id| graph.configuration(*id).unwrap().kind)
                .collect();
            assert_eq!(kinds, vec![ConfigurationKind::Debug, ConfigurationKind::Release]);
        }
    }

    #[test]
    fn test_source_group_uses_source_root_path() {
        let info = ProjectInfo::new("TripBro").with_source_root("App");
        let graph = ManifestGraph::scaffold(info, &mut IdAllocator::new()).unwrap();
        let group = graph.group(graph.source_group).unwrap();
        assert_eq!(group.path.as_deref(), Some("App"));
        assert_eq!(graph.main_group().children[0].id, graph.source_group);
    }

    #[test]
    fn test_file_type_for_extension() {
        assert_eq!(file_type_for("Views/ContentView.swift"), "sourcecode.swift");
        assert_eq!(file_type_for("legacy.m"), "sourcecode.c.objc");
        assert_eq!(file_type_for("bridge.h"), "sourcecode.c.h");
        assert_eq!(file_type_for("README"), "text");
    }

    #[test]
    fn test_add_to_unknown_group_fails() {
        let mut graph = scaffold();
        let stray = ObjectId::from_u128(42);
        assert!(graph.add_group(stray, ObjectId::from_u128(43), "x").is_none());
    }
}
