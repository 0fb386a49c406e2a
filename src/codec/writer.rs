//! Rendering a [`ManifestGraph`] to manifest text.
//!
//! Output layout:
//!
//! ```text
//! // !$*UTF8*$!
//! {
//!     archiveVersion = 1;
//!     classes = {
//!     };
//!     objectVersion = 56;
//!     objects = {
//!
//! /* Begin PBXBuildFile section */
//!         ...
//! /* End PBXBuildFile section */
//!     ...
//!     };
//!     rootObject = <project> /* Project object */;
//! }
//! ```
//!
//! Every section is written even when empty so that the incremental patcher
//! always finds its anchors.

use crate::codec::Section;
use crate::core::graph::{
    BuildFile, BuildPhase, FileKind, FileReference, Group, ListOwner, ManifestGraph,
};
use crate::core::id::ObjectId;
use crate::core::value::{comment, quote, Value};

/// Header line identifying the text encoding.
pub const HEADER: &str = "// !$*UTF8*$!";

pub const ARCHIVE_VERSION: &str = "1";

/// `buildActionMask` written on every build phase.
pub const BUILD_ACTION_MASK: &str = "2147483647";

/// One object of the `objects` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: ObjectId,
    pub comment: Option<String>,
    pub fields: Vec<(String, Value)>,
    /// Written on a single line
    pub inline: bool,
}

impl Record {
    fn new(id: ObjectId, comment: Option<String>, isa: &str) -> Self {
        Record {
            id,
            comment,
            fields: vec![("isa".to_string(), Value::from(isa))],
            inline: false,
        }
    }

    fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

/// Record for a build file line.
pub fn build_file_record(build_file: &BuildFile) -> Record {
    Record::new(
        build_file.id,
        Some(format!(
            "{} in {}",
            build_file.file_name,
            build_file.phase.name()
        )),
        "PBXBuildFile",
    )
    .field(
        "fileRef",
        Value::reference(build_file.file_ref, build_file.file_name.clone()),
    )
    .inline()
}

/// Record for a file reference line.
pub fn file_reference_record(file: &FileReference) -> Record {
    let record = Record::new(file.id, Some(file.name.clone()), "PBXFileReference");
    match file.kind {
        FileKind::Product => record
            .field("explicitFileType", "wrapper.application")
            .field("includeInIndex", "0")
            .field("path", file.path.as_str())
            .field("sourceTree", "BUILT_PRODUCTS_DIR")
            .inline(),
        FileKind::Source(file_type) => {
            let mut record = record.field("lastKnownFileType", file_type);
            if file.path != file.name {
                record = record.field("name", file.name.as_str());
            }
            record
                .field("path", file.path.as_str())
                .field("sourceTree", "<group>")
                .inline()
        }
    }
}

/// Render one record, indented as a member of `objects`.
pub fn render_record(out: &mut String, record: &Record) {
    out.push_str("\t\t");
    out.push_str(&record.id.to_string());
    if let Some(c) = &record.comment {
        out.push_str(" /* ");
        out.push_str(&comment(c));
        out.push_str(" */");
    }
    out.push_str(" = ");

    if record.inline {
        out.push('{');
        for (key, value) in &record.fields {
            out.push_str(&quote(key));
            out.push_str(" = ");
            write_inline(out, value);
            out.push_str("; ");
        }
        out.push_str("};\n");
    } else {
        write_dict(out, &record.fields, 2);
        out.push_str(";\n");
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_ref(out: &mut String, id: ObjectId, note: Option<&str>) {
    out.push_str(&id.to_string());
    if let Some(c) = note {
        out.push_str(" /* ");
        out.push_str(&comment(c));
        out.push_str(" */");
    }
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::Ref(id, note) => write_ref(out, *id, note.as_deref()),
        Value::Array(items) => {
            out.push('(');
            for item in items {
                write_inline(out, item);
                out.push_str(", ");
            }
            out.push(')');
        }
        Value::Dict(entries) => {
            out.push('{');
            for (key, value) in entries {
                out.push_str(&quote(key));
                out.push_str(" = ");
                write_inline(out, value);
                out.push_str("; ");
            }
            out.push('}');
        }
    }
}

/// Write `value` whose key sits at indentation `depth`.
fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::Ref(id, note) => write_ref(out, *id, note.as_deref()),
        Value::Array(items) => {
            out.push_str("(\n");
            for item in items {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(')');
        }
        Value::Dict(entries) => write_dict(out, entries, depth),
    }
}

fn write_dict(out: &mut String, entries: &[(String, Value)], depth: usize) {
    out.push_str("{\n");
    for (key, value) in entries {
        indent(out, depth + 1);
        out.push_str(&quote(key));
        out.push_str(" = ");
        write_value(out, value, depth + 1);
        out.push_str(";\n");
    }
    indent(out, depth);
    out.push('}');
}

/// Renders a whole graph.
pub struct Serializer<'g> {
    graph: &'g ManifestGraph,
}

impl<'g> Serializer<'g> {
    pub fn new(graph: &'g ManifestGraph) -> Self {
        Serializer { graph }
    }

    /// Produce the complete manifest text.
    pub fn render(&self) -> String {
        let graph = self.graph;
        let mut out = String::with_capacity(16 * 1024);

        out.push_str(HEADER);
        out.push_str("\n{\n");
        out.push_str(&format!("\tarchiveVersion = {};\n", ARCHIVE_VERSION));
        out.push_str("\tclasses = {\n\t};\n");
        out.push_str(&format!("\tobjectVersion = {};\n", graph.info.object_version));
        out.push_str("\tobjects = {\n");

        for section in Section::ALL {
            out.push('\n');
            out.push_str(&section.begin_marker());
            out.push('\n');
            for record in self.records(section) {
                render_record(&mut out, &record);
            }
            out.push_str(&section.end_marker());
            out.push('\n');
        }

        out.push_str("\t};\n");
        out.push_str("\trootObject = ");
        write_ref(&mut out, graph.project.id, Some("Project object"));
        out.push_str(";\n}\n");
        out
    }

    /// Records of `section` in creation order.
    pub fn records(&self, section: Section) -> Vec<Record> {
        let graph = self.graph;
        match section {
            Section::BuildFile => graph.build_files.iter().map(build_file_record).collect(),
            Section::FileReference => graph.file_refs.iter().map(file_reference_record).collect(),
            Section::FrameworksBuildPhase => vec![self.phase_record(&graph.frameworks)],
            Section::Group => graph.groups.iter().map(|g| self.group_record(g)).collect(),
            Section::NativeTarget => vec![self.target_record()],
            Section::Project => vec![self.project_record()],
            Section::ResourcesBuildPhase => vec![self.phase_record(&graph.resources)],
            Section::SourcesBuildPhase => vec![self.phase_record(&graph.sources)],
            Section::BuildConfiguration => graph
                .configurations
                .iter()
                .map(|c| {
                    Record::new(c.id, Some(c.kind.name().to_string()), "XCBuildConfiguration")
                        .field("buildSettings", c.settings.to_value())
                        .field("name", c.kind.name())
                })
                .collect(),
            Section::ConfigurationList => graph
                .configuration_lists
                .iter()
                .map(|list| {
                    let configurations = list
                        .configurations
                        .iter()
                        .filter_map(|id| graph.configuration(*id))
                        .map(|c| Value::reference(c.id, c.kind.name()))
                        .collect();
                    Record::new(
                        list.id,
                        Some(self.list_comment(list.owner)),
                        "XCConfigurationList",
                    )
                    .field("buildConfigurations", Value::Array(configurations))
                    .field("defaultConfigurationIsVisible", "0")
                    .field("defaultConfigurationName", list.default.name())
                })
                .collect(),
        }
    }

    fn list_comment(&self, owner: ListOwner) -> String {
        match owner {
            ListOwner::Project => {
                format!("Build configuration list for PBXProject \"{}\"", self.graph.info.name)
            }
            ListOwner::Target => format!(
                "Build configuration list for PBXNativeTarget \"{}\"",
                self.graph.info.name
            ),
        }
    }

    fn phase_record(&self, phase: &BuildPhase) -> Record {
        let files = phase
            .files
            .iter()
            .filter_map(|id| self.graph.build_file(*id))
            .map(|b| Value::reference(b.id, format!("{} in {}", b.file_name, phase.kind.name())))
            .collect();

        Record::new(phase.id, Some(phase.kind.name().to_string()), phase.kind.isa())
            .field("buildActionMask", BUILD_ACTION_MASK)
            .field("files", Value::Array(files))
            .field("runOnlyForDeploymentPostprocessing", "0")
    }

    fn group_record(&self, group: &Group) -> Record {
        let children = group
            .children
            .iter()
            .map(|c| Value::reference(c.id, c.name.clone()))
            .collect();

        let mut record = Record::new(
            group.id,
            group.display_name().map(str::to_string),
            "PBXGroup",
        )
        .field("children", Value::Array(children));
        if let Some(name) = &group.name {
            record = record.field("name", name.as_str());
        }
        if let Some(path) = &group.path {
            record = record.field("path", path.as_str());
        }
        record.field("sourceTree", "<group>")
    }

    fn target_record(&self) -> Record {
        let graph = self.graph;
        let target = &graph.target;
        let phases = target
            .build_phases
            .iter()
            .filter_map(|id| {
                [&graph.sources, &graph.frameworks, &graph.resources]
                    .into_iter()
                    .find(|p| p.id == *id)
            })
            .map(|p| Value::reference(p.id, p.kind.name()))
            .collect();
        let product_name = graph.info.product_name();

        Record::new(target.id, Some(target.name.clone()), "PBXNativeTarget")
            .field(
                "buildConfigurationList",
                Value::reference(target.configuration_list, self.list_comment(ListOwner::Target)),
            )
            .field("buildPhases", Value::Array(phases))
            .field("buildRules", Value::empty_array())
            .field("dependencies", Value::empty_array())
            .field("name", target.name.as_str())
            .field("productName", target.name.as_str())
            .field(
                "productReference",
                Value::reference(target.product_ref, product_name),
            )
            .field("productType", "com.apple.product-type.application")
    }

    fn project_record(&self) -> Record {
        let graph = self.graph;
        let project = &graph.project;

        let target_attributes = project
            .targets
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    Value::Dict(vec![(
                        "CreatedOnToolsVersion".to_string(),
                        Value::from("15.0"),
                    )]),
                )
            })
            .collect();
        let attributes = Value::Dict(vec![
            ("BuildIndependentTargetsInParallel".to_string(), Value::from("1")),
            ("LastSwiftUpdateCheck".to_string(), Value::from("1500")),
            ("LastUpgradeVersion".to_string(), Value::from("1500")),
            ("TargetAttributes".to_string(), Value::Dict(target_attributes)),
        ]);
        let targets = project
            .targets
            .iter()
            .map(|id| Value::reference(*id, graph.target.name.clone()))
            .collect();

        Record::new(project.id, Some("Project object".to_string()), "PBXProject")
            .field("attributes", attributes)
            .field(
                "buildConfigurationList",
                Value::reference(project.configuration_list, self.list_comment(ListOwner::Project)),
            )
            .field("compatibilityVersion", "Xcode 14.0")
            .field("developmentRegion", "en")
            .field("hasScannedForEncodings", "0")
            .field(
                "knownRegions",
                Value::Array(vec![Value::from("en"), Value::from("Base")]),
            )
            .field("mainGroup", Value::bare_ref(project.main_group))
            .field(
                "productRefGroup",
                Value::reference(project.products_group, "Products"),
            )
            .field("projectDirPath", "")
            .field("projectRoot", "")
            .field("targets", Value::Array(targets))
    }
}

/// Render `graph` to manifest text.
pub fn to_string(graph: &ManifestGraph) -> String {
    Serializer::new(graph).render()
}
