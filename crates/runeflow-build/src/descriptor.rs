//! Image descriptor resolution.
//!
//! A descriptor says which images to build or push, under which tags, from
//! which Dockerfiles. Two input forms are accepted:
//!
//! ```text
//! api,api:v2,worker:1.0[docker/Dockerfile.worker]
//! ```
//!
//! ```json
//! {"docker": {"api": {"tags": ["latest", "v2"]},
//!             "worker": {"dockerFile": "docker/Dockerfile.worker", "tags": ["1.0"]}}}
//! ```
//!
//! Both resolve to the same [`BuildGroup`]: build file -> ordered targets.
//!
//! Image names stop at the first `:`, `[` or `.`, so dotted names are
//! rejected rather than truncated.

use crate::defaults::DefaultsResolver;
use crate::error::{DescriptorError, DescriptorResult};
use runeflow_core::is_normalized;
use serde::Deserialize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_BUILD_FILE: &str = "Dockerfile";

const MAX_TAG_LEN: usize = 128;

/// A single requested image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub name: String,
    pub tag: String,
    pub build_file: String,
}

impl ImageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: DEFAULT_TAG.to_string(),
            build_file: DEFAULT_BUILD_FILE.to_string(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_build_file(mut self, build_file: impl Into<String>) -> Self {
        self.build_file = build_file.into();
        self
    }

    pub fn target(&self) -> ImageTarget {
        ImageTarget {
            name: self.name.clone(),
            tag: self.tag.clone(),
        }
    }
}

/// A local `name:tag` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTarget {
    pub name: String,
    pub tag: String,
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Build file -> ordered targets, in first-encountered order.
///
/// Duplicate targets are kept: declaring a target twice builds it twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildGroup {
    groups: Vec<(String, Vec<ImageTarget>)>,
}

impl BuildGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `descriptor` to the group of its build file.
    pub fn push(&mut self, descriptor: ImageDescriptor) {
        let target = descriptor.target();
        match self
            .groups
            .iter_mut()
            .find(|(file, _)| *file == descriptor.build_file)
        {
            Some((_, targets)) => targets.push(target),
            None => self.groups.push((descriptor.build_file, vec![target])),
        }
    }

    pub fn get(&self, build_file: &str) -> Option<&[ImageTarget]> {
        self.groups
            .iter()
            .find(|(file, _)| file == build_file)
            .map(|(_, targets)| targets.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ImageTarget])> {
        self.groups
            .iter()
            .map(|(file, targets)| (file.as_str(), targets.as_slice()))
    }

    /// All targets, group order then in-group order.
    pub fn targets(&self) -> impl Iterator<Item = &ImageTarget> {
        self.groups.iter().flat_map(|(_, targets)| targets.iter())
    }

    /// Number of build files.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Plain `(build file, ["name:tag", ...])` pairs.
    pub fn to_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.iter()
            .map(|(file, targets)| {
                (
                    file.to_string(),
                    targets.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    /// Renders the group as a structured descriptor document.
    ///
    /// Tags of one image are grouped under its name, so the relative order of
    /// different images' tags within a build file is not preserved.
    pub fn to_document(&self) -> DescriptorResult<Value> {
        let mut images = Map::new();

        for (file, targets) in self.iter() {
            for target in targets {
                let entry = images
                    .entry(target.name.clone())
                    .or_insert_with(|| serde_json::json!({ "dockerFile": file, "tags": [] }));

                if entry.get("dockerFile").and_then(Value::as_str) != Some(file) {
                    return Err(DescriptorError::NotRepresentable {
                        name: target.name.clone(),
                    });
                }
                if let Some(Value::Array(tags)) = entry.get_mut("tags") {
                    tags.push(Value::String(target.tag.clone()));
                }
            }
        }

        Ok(serde_json::json!({ "docker": images }))
    }
}

impl Serialize for BuildGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (file, targets) in self.iter() {
            let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
            map.serialize_entry(file, &targets)?;
        }
        map.end()
    }
}

/// Which input form produced a [`BuildGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorSource {
    Document,
    Grammar,
    /// No descriptor given; the default image name was used
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDescriptor {
    pub group: BuildGroup,
    pub source: DescriptorSource,
}

/// Resolves an optional raw descriptor, falling back to the default image.
pub fn resolve(raw: Option<&str>, defaults: &DefaultsResolver) -> DescriptorResult<ResolvedDescriptor> {
    match raw {
        Some(raw) => parse(raw),
        None => {
            let name = defaults.default_image_name()?;
            tracing::debug!("No descriptor given, using default image name {}", name);
            Ok(ResolvedDescriptor {
                group: parse_string_grammar(&name)?,
                source: DescriptorSource::Default,
            })
        }
    }
}

/// Parses a present descriptor: document form first, string grammar second.
pub fn parse(raw: &str) -> DescriptorResult<ResolvedDescriptor> {
    if let Some(document) = try_parse_document(raw) {
        return Ok(ResolvedDescriptor {
            group: document?,
            source: DescriptorSource::Document,
        });
    }

    Ok(ResolvedDescriptor {
        group: parse_string_grammar(raw)?,
        source: DescriptorSource::Grammar,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentEntry {
    #[serde(rename = "dockerFile")]
    docker_file: Option<String>,
    tags: Option<Vec<String>>,
}

/// Attempts the structured-document form.
///
/// Returns `None` when `raw` is not a JSON object with a `docker` object, in
/// which case the caller falls back to the string grammar.
pub fn try_parse_document(raw: &str) -> Option<DescriptorResult<BuildGroup>> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let images = match value.get("docker") {
        Some(Value::Object(images)) => images,
        _ => {
            tracing::debug!("Descriptor is JSON but has no docker object, using string grammar");
            return None;
        }
    };

    Some(parse_document_images(images))
}

fn parse_document_images(images: &Map<String, Value>) -> DescriptorResult<BuildGroup> {
    let mut group = BuildGroup::new();

    for (name, entry) in images {
        validate_name(name)?;

        let entry: DocumentEntry = if entry.is_null() {
            DocumentEntry::default()
        } else {
            serde_json::from_value(entry.clone()).map_err(|e| {
                DescriptorError::InvalidDocument(format!("entry '{}': {}", name, e))
            })?
        };

        let build_file = match entry.docker_file {
            Some(file) if file.trim().is_empty() => {
                return Err(DescriptorError::InvalidDocument(format!(
                    "entry '{}': dockerFile is empty",
                    name
                )));
            }
            Some(file) => file,
            None => DEFAULT_BUILD_FILE.to_string(),
        };

        let tags = match entry.tags {
            Some(tags) if !tags.is_empty() => tags,
            _ => vec![DEFAULT_TAG.to_string()],
        };

        for tag in tags {
            validate_tag(name, &tag)?;
            group.push(
                ImageDescriptor::new(name.as_str())
                    .with_tag(tag)
                    .with_build_file(build_file.clone()),
            );
        }
    }

    Ok(group)
}

/// Parses the comma-separated `<name>[:<tag>][[<buildFile>]]` grammar.
pub fn parse_string_grammar(raw: &str) -> DescriptorResult<BuildGroup> {
    let mut group = BuildGroup::new();

    for fragment in raw.split(',') {
        group.push(parse_fragment(fragment.trim())?);
    }

    Ok(group)
}

/// Parses one `<name>[:<tag>][[<buildFile>]]` fragment.
pub fn parse_fragment(fragment: &str) -> DescriptorResult<ImageDescriptor> {
    let malformed = |reason: &str| DescriptorError::Malformed {
        fragment: fragment.to_string(),
        reason: reason.to_string(),
    };

    let (head, build_file) = match fragment.find('[') {
        Some(open) => {
            let rest = &fragment[open + 1..];
            let close = rest.find(']').ok_or_else(|| malformed("missing ']'"))?;
            if close + 1 != rest.len() {
                return Err(malformed("unexpected text after ']'"));
            }
            let build_file = rest[..close].trim();
            if build_file.is_empty() {
                return Err(malformed("empty build file"));
            }
            (&fragment[..open], Some(build_file))
        }
        None => (fragment, None),
    };

    let name_end = head.find([':', '.']).unwrap_or(head.len());
    let name = &head[..name_end];

    if head[name_end..].starts_with('.') {
        // Report the dotted name as a whole
        let dotted = head.split(':').next().unwrap_or(head);
        return Err(DescriptorError::InvalidName {
            name: dotted.to_string(),
        });
    }
    validate_name(name)?;

    let tag = match head[name_end..].strip_prefix(':') {
        Some(tag) => {
            validate_tag(name, tag)?;
            tag
        }
        None => DEFAULT_TAG,
    };

    let mut descriptor = ImageDescriptor::new(name).with_tag(tag);
    if let Some(build_file) = build_file {
        descriptor = descriptor.with_build_file(build_file);
    }
    Ok(descriptor)
}

fn validate_name(name: &str) -> DescriptorResult<()> {
    if is_normalized(name) {
        Ok(())
    } else {
        Err(DescriptorError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Checks `tag` against the Docker tag rules.
///
/// - 1 to 128 characters
/// - ASCII letters, digits, `.`, `-`, `_`
/// - does not start with `.` or `-`
pub fn validate_tag(name: &str, tag: &str) -> DescriptorResult<()> {
    let invalid = |reason: String| DescriptorError::InvalidTag {
        name: name.to_string(),
        tag: tag.to_string(),
        reason,
    };

    if tag.is_empty() {
        return Err(invalid("tag is empty".to_string()));
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(invalid(format!(
            "too long ({} characters, max {})",
            tag.len(),
            MAX_TAG_LEN
        )));
    }
    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(invalid("must not start with '.' or '-'".to_string()));
    }
    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_'))
    {
        return Err(invalid(format!("invalid character '{}'", c)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeflow_core::{ParameterKey, StaticParameters};
    use std::sync::Arc;

    fn pairs(group: &BuildGroup) -> Vec<(String, Vec<String>)> {
        group.to_pairs()
    }

    fn expect(file: &str, targets: &[&str]) -> Vec<(String, Vec<String>)> {
        vec![(
            file.to_string(),
            targets.iter().map(|t| t.to_string()).collect(),
        )]
    }

    fn grammar(raw: &str) -> BuildGroup {
        let resolved = parse(raw).unwrap();
        assert_eq!(resolved.source, DescriptorSource::Grammar, "raw: {raw}");
        resolved.group
    }

    #[test]
    fn test_name_and_tag() {
        assert_eq!(pairs(&grammar("app:v1")), expect("Dockerfile", &["app:v1"]));
    }

    #[test]
    fn test_default_tag() {
        assert_eq!(pairs(&grammar("app")), expect("Dockerfile", &["app:latest"]));
    }

    #[test]
    fn test_custom_build_file_default_tag() {
        assert_eq!(
            pairs(&grammar("app[docker/Dockerfile.app]")),
            expect("docker/Dockerfile.app", &["app:latest"])
        );
    }

    #[test]
    fn test_tag_and_build_file() {
        assert_eq!(pairs(&grammar("app:v1[df]")), expect("df", &["app:v1"]));
    }

    #[test]
    fn test_multiple_fragments_keep_order() {
        assert_eq!(
            pairs(&grammar("a,b")),
            expect("Dockerfile", &["a:latest", "b:latest"])
        );
        assert_eq!(
            pairs(&grammar("zeta, alpha ,mid")),
            expect("Dockerfile", &["zeta:latest", "alpha:latest", "mid:latest"])
        );
    }

    #[test]
    fn test_groups_by_build_file_in_first_seen_order() {
        let group = grammar("api:v1[api.Dockerfile],web,api:v2[api.Dockerfile],worker[w.Dockerfile]");
        assert_eq!(
            pairs(&group),
            vec![
                (
                    "api.Dockerfile".to_string(),
                    vec!["api:v1".to_string(), "api:v2".to_string()]
                ),
                ("Dockerfile".to_string(), vec!["web:latest".to_string()]),
                ("w.Dockerfile".to_string(), vec!["worker:latest".to_string()]),
            ]
        );
        assert_eq!(group.len(), 3);
        assert_eq!(group.targets().count(), 4);
    }

    #[test]
    fn test_same_name_different_tags_tracked_independently() {
        assert_eq!(
            pairs(&grammar("my-image,my-image:custom")),
            expect("Dockerfile", &["my-image:latest", "my-image:custom"])
        );
    }

    #[test]
    fn test_duplicates_are_preserved() {
        assert_eq!(
            pairs(&grammar("a,a")),
            expect("Dockerfile", &["a:latest", "a:latest"])
        );
    }

    #[test]
    fn test_path_separator_in_name_is_rejected() {
        assert_eq!(
            parse("org/app:v1").unwrap_err(),
            DescriptorError::InvalidName {
                name: "org/app".to_string()
            }
        );
    }

    #[test]
    fn test_uppercase_name_is_rejected() {
        assert_eq!(
            parse("MyApp").unwrap_err(),
            DescriptorError::InvalidName {
                name: "MyApp".to_string()
            }
        );
    }

    #[test]
    fn test_dotted_name_is_rejected_whole() {
        assert_eq!(
            parse("my.image:v1").unwrap_err(),
            DescriptorError::InvalidName {
                name: "my.image".to_string()
            }
        );
    }

    #[test]
    fn test_one_bad_fragment_fails_everything() {
        let err = parse("good,Bad Name,other").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::InvalidName {
                name: "Bad Name".to_string()
            }
        );
    }

    #[test]
    fn test_empty_fragments_are_errors() {
        assert!(matches!(
            parse(""),
            Err(DescriptorError::InvalidName { name }) if name.is_empty()
        ));
        assert!(matches!(
            parse("a,"),
            Err(DescriptorError::InvalidName { name }) if name.is_empty()
        ));
        assert!(matches!(
            parse(":v1"),
            Err(DescriptorError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_invalid_tags() {
        assert!(matches!(parse("a:"), Err(DescriptorError::InvalidTag { .. })));
        assert!(matches!(parse("a:-x"), Err(DescriptorError::InvalidTag { .. })));
        assert!(matches!(parse("a:b:c"), Err(DescriptorError::InvalidTag { .. })));
        let long = format!("a:{}", "x".repeat(129));
        assert!(matches!(parse(&long), Err(DescriptorError::InvalidTag { .. })));
        assert!(parse("a:1.2.3_rc-1").is_ok());
    }

    #[test]
    fn test_malformed_build_file() {
        assert!(matches!(parse("a[df"), Err(DescriptorError::Malformed { .. })));
        assert!(matches!(parse("a[]"), Err(DescriptorError::Malformed { .. })));
        assert!(matches!(parse("a[df]x"), Err(DescriptorError::Malformed { .. })));
    }

    #[test]
    fn test_document_equivalents() {
        let cases = [
            (r#"{"docker": {"n": {"tags": ["t"]}}}"#, "n:t"),
            (r#"{"docker": {"n": {}}}"#, "n"),
            (r#"{"docker": {"n": {"dockerFile": "df"}}}"#, "n[df]"),
            (r#"{"docker": {"n": {"dockerFile": "df", "tags": ["t"]}}}"#, "n:t[df]"),
            (r#"{"docker": {"a": null, "b": {}}}"#, "a,b"),
        ];

        for (document, string) in cases {
            let from_document = parse(document).unwrap();
            assert_eq!(from_document.source, DescriptorSource::Document);
            assert_eq!(from_document.group, grammar(string), "document: {document}");
        }
    }

    #[test]
    fn test_document_multiple_tags_and_key_order() {
        let group = parse(
            r#"{"docker": {"web": {"tags": ["1.0", "latest"]}, "api": {"dockerFile": "api/Dockerfile"}}}"#,
        )
        .unwrap()
        .group;

        assert_eq!(
            pairs(&group),
            vec![
                (
                    "Dockerfile".to_string(),
                    vec!["web:1.0".to_string(), "web:latest".to_string()]
                ),
                ("api/Dockerfile".to_string(), vec!["api:latest".to_string()]),
            ]
        );
    }

    #[test]
    fn test_document_validates_names() {
        assert_eq!(
            parse(r#"{"docker": {"Org/App": {}}}"#).unwrap_err(),
            DescriptorError::InvalidName {
                name: "Org/App".to_string()
            }
        );
    }

    #[test]
    fn test_document_with_wrong_shape_is_an_error() {
        assert!(matches!(
            parse(r#"{"docker": {"app": {"tags": "latest"}}}"#),
            Err(DescriptorError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_non_document_json_falls_back_to_grammar() {
        // Valid JSON without a docker object is reinterpreted as a descriptor string
        let err = parse(r#"{"image": 1}"#).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::InvalidName {
                name: r#"{"image""#.to_string()
            }
        );

        assert!(try_parse_document("[1, 2]").is_none());
        assert!(try_parse_document("{not json").is_none());
        assert!(try_parse_document("app:v1").is_none());
    }

    #[test]
    fn test_document_round_trip() {
        let group = grammar("a:latest,a:v2,b[other],c:1.0");
        let document = group.to_document().unwrap();

        let reparsed = parse(&document.to_string()).unwrap();
        assert_eq!(reparsed.source, DescriptorSource::Document);
        assert_eq!(reparsed.group, group);
    }

    #[test]
    fn test_document_round_trip_groups_tags_by_name() {
        let group = grammar("a,b,a:v2");
        let reparsed = parse(&group.to_document().unwrap().to_string())
            .unwrap()
            .group;

        assert_eq!(
            pairs(&reparsed),
            expect("Dockerfile", &["a:latest", "a:v2", "b:latest"])
        );
    }

    #[test]
    fn test_document_not_representable() {
        let group = grammar("a[one],a[two]");
        assert_eq!(
            group.to_document().unwrap_err(),
            DescriptorError::NotRepresentable {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let group = grammar("b[z],a");
        assert_eq!(
            serde_json::to_string(&group).unwrap(),
            r#"{"z":["b:latest"],"Dockerfile":["a:latest"]}"#
        );
    }

    #[test]
    fn test_resolve_without_descriptor_uses_default_name() {
        let params = StaticParameters::new().with(ParameterKey::ProjectName, "validUser/validRepoName");
        let defaults = DefaultsResolver::new(Arc::new(params));

        let resolved = resolve(None, &defaults).unwrap();
        assert_eq!(resolved.source, DescriptorSource::Default);
        assert_eq!(
            pairs(&resolved.group),
            expect("Dockerfile", &["validuser-validreponame:latest"])
        );
    }

    #[test]
    fn test_resolve_without_descriptor_or_project_name() {
        let defaults = DefaultsResolver::new(Arc::new(StaticParameters::new()));
        assert!(matches!(
            resolve(None, &defaults),
            Err(DescriptorError::MissingParameter { .. })
        ));
    }
}
