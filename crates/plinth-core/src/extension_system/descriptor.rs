use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extension_system::error::ExtensionSystemError;
use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::utils::naming::normalize_identifier;

/// A configurable field declared in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub default: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Anything else the form builder understands
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_field_type() -> String {
    "text".to_string()
}

/// Identity, ordering and form metadata of one extension, read from its
/// `extension.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    #[serde(rename = "extension")]
    pub extension_type: String,
    pub name: String,
    pub version: Version,
    pub title: String,
    pub description: String,
    pub multiple: bool,
    pub priority: i64,
    pub depends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(rename = "creationDate", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

// --- Intermediate struct for deserialization ---

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RawManifest {
    extension: Option<String>,
    name: Option<String>,
    version: Option<String>,
    title: Option<String>,
    description: Option<String>,
    multiple: bool,
    priority: i64,
    depends: Vec<String>,
    author: Option<String>,
    email: Option<String>,
    website: Option<String>,
    #[serde(rename = "creationDate")]
    creation_date: Option<String>,
    copyright: Option<String>,
    license: Option<String>,
    fields: Vec<FieldDefinition>,
}

/// Parse a version leniently: `"1"` and `"1.2"` are padded to full semver.
pub fn parse_version(raw: &str) -> std::result::Result<Version, semver::Error> {
    let raw = raw.trim().trim_start_matches('v');
    match raw.matches('.').count() {
        0 => Version::parse(&format!("{}.0.0", raw)),
        1 => Version::parse(&format!("{}.0", raw)),
        _ => Version::parse(raw),
    }
}

impl ExtensionDescriptor {
    /// Parse manifest JSON. `source` is only used in error messages.
    pub fn from_json(content: &str, source: &Path) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_str(content).map_err(|e| ExtensionSystemError::ManifestInvalid {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut missing = Vec::new();
        let extension_type = raw.extension.filter(|s| !s.trim().is_empty());
        let name = raw.name.filter(|s| !s.trim().is_empty());
        if extension_type.is_none() {
            missing.push("extension".to_string());
        }
        if name.is_none() {
            missing.push("name".to_string());
        }
        let (Some(extension_type), Some(name)) = (extension_type, name) else {
            let display_name = source
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string());
            return Err(ExtensionSystemError::ManifestFieldsMissing {
                name: display_name,
                fields: missing,
            }
            .into());
        };

        let version = match raw.version.as_deref() {
            Some(v) => parse_version(v).map_err(|e| ExtensionSystemError::ManifestInvalid {
                path: source.to_path_buf(),
                message: format!("invalid version '{}': {}", v, e),
            })?,
            None => Version::new(1, 0, 0),
        };

        Ok(ExtensionDescriptor {
            title: raw.title.unwrap_or_else(|| name.clone()),
            description: raw.description.unwrap_or_default(),
            extension_type,
            name,
            version,
            multiple: raw.multiple,
            priority: raw.priority,
            depends: raw.depends.iter().map(|d| normalize_identifier(d)).collect(),
            author: raw.author,
            email: raw.email,
            website: raw.website,
            creation_date: raw.creation_date,
            copyright: raw.copyright,
            license: raw.license,
            fields: raw.fields,
        })
    }

    /// Read and parse a manifest file
    pub fn load(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let content = provider.read_to_string(path)?;
        Self::from_json(&content, path)
    }

    /// Default plugin values: each field's declared default, keyed by name
    pub fn field_defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect()
    }
}

/// Builder for descriptors declared in code rather than read from disk
pub struct DescriptorBuilder {
    descriptor: ExtensionDescriptor,
}

impl DescriptorBuilder {
    pub fn new(extension_type: &str, name: &str) -> Self {
        Self {
            descriptor: ExtensionDescriptor {
                extension_type: extension_type.to_string(),
                name: name.to_string(),
                version: Version::new(1, 0, 0),
                title: name.to_string(),
                description: String::new(),
                multiple: false,
                priority: 0,
                depends: Vec::new(),
                author: None,
                email: None,
                website: None,
                creation_date: None,
                copyright: None,
                license: None,
                fields: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.descriptor.version = version;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.descriptor.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.descriptor.description = description.to_string();
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.descriptor.multiple = multiple;
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.descriptor.priority = priority;
        self
    }

    pub fn depends_on(mut self, identifier: &str) -> Self {
        self.descriptor.depends.push(normalize_identifier(identifier));
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.descriptor.author = Some(author.to_string());
        self
    }

    pub fn license(mut self, license: &str) -> Self {
        self.descriptor.license = Some(license.to_string());
        self
    }

    pub fn field(mut self, name: &str, default: Value) -> Self {
        self.descriptor.fields.push(FieldDefinition {
            name: name.to_string(),
            default,
            validation: None,
            field_type: default_field_type(),
            label: None,
            extra: Map::new(),
        });
        self
    }

    pub fn build(self) -> ExtensionDescriptor {
        self.descriptor
    }
}
