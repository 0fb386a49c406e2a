//! Manifest text format.
//!
//! The manifest is a nested associative array: dictionaries `{ k = v; }`,
//! arrays `( a, b, )`, and bare or quoted strings. Objects live in one
//! `objects` map, grouped into sections delimited by
//! `/* Begin <Section> section */` and `/* End <Section> section */` comments.

pub mod reader;
pub mod writer;

pub use reader::{parse, Document, ParseError};
pub use writer::{render_record, to_string, Record, Serializer};

/// The sections of the `objects` map, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    BuildFile,
    FileReference,
    FrameworksBuildPhase,
    Group,
    NativeTarget,
    Project,
    ResourcesBuildPhase,
    SourcesBuildPhase,
    BuildConfiguration,
    ConfigurationList,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::BuildFile,
        Section::FileReference,
        Section::FrameworksBuildPhase,
        Section::Group,
        Section::NativeTarget,
        Section::Project,
        Section::ResourcesBuildPhase,
        Section::SourcesBuildPhase,
        Section::BuildConfiguration,
        Section::ConfigurationList,
    ];

    /// The `isa` value of every object in this section.
    pub fn isa(&self) -> &'static str {
        match self {
            Section::BuildFile => "PBXBuildFile",
            Section::FileReference => "PBXFileReference",
            Section::FrameworksBuildPhase => "PBXFrameworksBuildPhase",
            Section::Group => "PBXGroup",
            Section::NativeTarget => "PBXNativeTarget",
            Section::Project => "PBXProject",
            Section::ResourcesBuildPhase => "PBXResourcesBuildPhase",
            Section::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Section::BuildConfiguration => "XCBuildConfiguration",
            Section::ConfigurationList => "XCConfigurationList",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.isa() == isa)
    }

    pub fn begin_marker(&self) -> String {
        format!("/* Begin {} section */", self.isa())
    }

    pub fn end_marker(&self) -> String {
        format!("/* End {} section */", self.isa())
    }
}
