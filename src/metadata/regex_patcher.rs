use std::fs;
use std::path::Path;

use regex::{NoExpand, Regex};
use tracing::debug;

use super::{MetadataFormat, MetadataPatcher};
use crate::domain::Version;
use crate::error::{ReleaseToolError, Result};

const MSBUILD_ELEMENTS: [&str; 4] = [
    "Version",
    "AssemblyVersion",
    "FileVersion",
    "InformationalVersion",
];

/// Patches version fields using regular expressions.
///
/// Only the matched fields change; formatting, comments and every other
/// line of the file are preserved.
pub struct RegexPatcher {
    toml_section: Regex,
    toml_version: Regex,
    npm_version: Regex,
    msbuild_elements: Vec<(&'static str, Regex)>,
    msbuild_property_group: Regex,
    assembly_version: Regex,
    assembly_file_version: Regex,
    assembly_informational_version: Regex,
}

impl RegexPatcher {
    pub fn new() -> Result<Self> {
        let msbuild_elements = MSBUILD_ELEMENTS
            .iter()
            .map(|name| -> Result<(&'static str, Regex)> {
                Ok((*name, Regex::new(&format!(r"<{0}>[^<]*</{0}>", name))?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RegexPatcher {
            toml_section: Regex::new(r"^\s*\[\[?([^\[\]]+)\]\]?\s*(#.*)?$")?,
            toml_version: Regex::new(r#"^(\s*version\s*=\s*")[^"]*(".*)$"#)?,
            npm_version: Regex::new(r#"("version"\s*:\s*")[^"]*(")"#)?,
            msbuild_elements,
            msbuild_property_group: Regex::new(r"<PropertyGroup>")?,
            assembly_version: Regex::new(
                r#"\[assembly\s*:\s*AssemblyVersion\s*\(\s*"[\d.]+"\s*\)\s*\]"#,
            )?,
            assembly_file_version: Regex::new(
                r#"\[assembly\s*:\s*AssemblyFileVersion\s*\(\s*"[\d.]+"\s*\)\s*\]"#,
            )?,
            assembly_informational_version: Regex::new(
                r#"\[assembly\s*:\s*AssemblyInformationalVersion\s*\(\s*"[\d.]+"\s*\)\s*\]"#,
            )?,
        })
    }

    /// Patch file content in memory
    pub fn patch_content(
        &self,
        format: MetadataFormat,
        content: &str,
        version: Version,
    ) -> std::result::Result<String, String> {
        match format {
            MetadataFormat::Cargo => Ok(self.patch_cargo(content, version)),
            MetadataFormat::Npm => Ok(self.patch_npm(content, version)),
            MetadataFormat::MsBuild => self.patch_msbuild(content, version),
            MetadataFormat::AssemblyInfo => Ok(self.patch_assembly_info(content, version)),
        }
    }

    /// `version = "..."` inside `[package]` or `[workspace.package]` only
    fn patch_cargo(&self, content: &str, version: Version) -> String {
        let replacement = format!("${{1}}{}${{2}}", version);
        let mut in_package = false;
        let mut output = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            let (body, ending) = split_line_ending(line);

            if let Some(captures) = self.toml_section.captures(body) {
                let section = captures[1].trim();
                in_package = section == "package" || section == "workspace.package";
                output.push_str(line);
                continue;
            }

            if in_package && self.toml_version.is_match(body) {
                output.push_str(&self.toml_version.replace(body, replacement.as_str()));
                output.push_str(ending);
            } else {
                output.push_str(line);
            }
        }

        output
    }

    /// The first `"version"` key of the root object; nested ones are skipped
    fn patch_npm(&self, content: &str, version: Version) -> String {
        let top_level = self.npm_version.captures_iter(content).find(|caps| {
            caps.get(0)
                .is_some_and(|m| json_depth(&content[..m.start()]) == 1)
        });

        let Some(caps) = top_level else {
            return content.to_string();
        };
        let (Some(whole), Some(prefix), Some(suffix)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            return content.to_string();
        };

        format!(
            "{}{}{}{}{}",
            &content[..whole.start()],
            prefix.as_str(),
            version,
            suffix.as_str(),
            &content[whole.end()..]
        )
    }

    fn msbuild_value(name: &str, version: Version) -> String {
        match name {
            "AssemblyVersion" => version.round_to_major().to_string(),
            "FileVersion" => format!("{}.0", version),
            _ => version.to_string(),
        }
    }

    /// Version elements of the first `<PropertyGroup>` without attributes.
    /// Conditional groups are left alone.
    fn patch_msbuild(&self, content: &str, version: Version) -> std::result::Result<String, String> {
        let elements: Vec<(&Regex, String)> = self
            .msbuild_elements
            .iter()
            .map(|(name, pattern)| {
                let value = Self::msbuild_value(name, version);
                (pattern, format!("<{0}>{1}</{0}>", name, value))
            })
            .collect();

        let Some(group) = self.msbuild_property_group.find(content) else {
            let project_end = content
                .rfind("</Project>")
                .ok_or_else(|| "no <Project> element found".to_string())?;
            let mut group = String::from("  <PropertyGroup>\n");
            for (_, element) in &elements {
                group.push_str(&format!("    {}\n", element));
            }
            group.push_str("  </PropertyGroup>\n");

            let mut patched = content.to_string();
            patched.insert_str(project_end, &group);
            return Ok(patched);
        };

        let body_start = group.end();
        let body_end = content[body_start..]
            .find("</PropertyGroup>")
            .map(|offset| body_start + offset)
            .ok_or_else(|| "unterminated <PropertyGroup>".to_string())?;

        let mut body = content[body_start..body_end].to_string();
        let mut insertion = String::new();
        for (pattern, element) in &elements {
            if pattern.is_match(&body) {
                body = pattern.replace_all(&body, NoExpand(element)).into_owned();
            } else {
                insertion.push_str(&format!("\n    {}", element));
            }
        }

        Ok(format!(
            "{}{}{}{}",
            &content[..body_start],
            insertion,
            body,
            &content[body_end..]
        ))
    }

    fn patch_assembly_info(&self, content: &str, version: Version) -> String {
        let assembly = format!(
            "[assembly: AssemblyVersion(\"{}.0\")]",
            version.round_to_major()
        );
        let file = format!("[assembly: AssemblyFileVersion(\"{}.0\")]", version);
        let informational = format!(
            "[assembly: AssemblyInformationalVersion(\"{}\")]",
            version
        );

        let patched = self
            .assembly_version
            .replace_all(content, NoExpand(&assembly));
        let patched = self
            .assembly_file_version
            .replace_all(&patched, NoExpand(&file));
        self.assembly_informational_version
            .replace_all(&patched, NoExpand(&informational))
            .into_owned()
    }
}

/// Object and array nesting depth at the end of `prefix`.
/// Brackets inside string literals are ignored.
fn json_depth(prefix: &str) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in prefix.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    depth
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let body = line.trim_end_matches(['\n', '\r']);
    (body, &line[body.len()..])
}

impl MetadataPatcher for RegexPatcher {
    fn patch_file(&self, path: &Path, version: Version) -> Result<bool> {
        let Some(format) = MetadataFormat::from_path(path) else {
            debug!(path = %path.display(), "not a recognised metadata file");
            return Ok(false);
        };

        let content = fs::read_to_string(path).map_err(|e| ReleaseToolError::io(path, e))?;
        let patched = self
            .patch_content(format, &content, version)
            .map_err(|message| ReleaseToolError::patch(path, message))?;

        if patched == content {
            debug!(path = %path.display(), "already at version {}", version);
            return Ok(false);
        }

        fs::write(path, patched).map_err(|e| ReleaseToolError::io(path, e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patcher() -> RegexPatcher {
        RegexPatcher::new().unwrap()
    }

    #[test]
    fn test_patch_cargo_package_version_only() {
        let manifest = "\
[package]
name = \"widget\"
version = \"0.1.0\" # bumped by release-tool
edition = \"2021\"

[dependencies]
serde = { version = \"1.0\" }

[dependencies.regex]
version = \"1.0\"
";
        let patched = patcher()
            .patch_content(MetadataFormat::Cargo, manifest, Version::new(1, 4, 2))
            .unwrap();

        assert!(patched.contains("version = \"1.4.2\" # bumped by release-tool"));
        assert!(patched.contains("[dependencies.regex]\nversion = \"1.0\"\n"));
        assert!(patched.contains("serde = { version = \"1.0\" }"));
    }

    #[test]
    fn test_patch_cargo_workspace_package() {
        let manifest = "[workspace]\nmembers = [\"a\"]\n\n[workspace.package]\r\nversion = \"0.3.0\"\r\n";
        let patched = patcher()
            .patch_content(MetadataFormat::Cargo, manifest, Version::new(0, 4, 0))
            .unwrap();
        assert!(patched.ends_with("[workspace.package]\r\nversion = \"0.4.0\"\r\n"));
    }

    #[test]
    fn test_patch_cargo_inherited_version_untouched() {
        let manifest = "[package]\nname = \"member\"\nversion.workspace = true\n";
        let patched = patcher()
            .patch_content(MetadataFormat::Cargo, manifest, Version::new(9, 9, 9))
            .unwrap();
        assert_eq!(patched, manifest);
    }

    #[test]
    fn test_patch_npm_first_version_only() {
        let package = r#"{
  "name": "widget",
  "version": "0.0.1",
  "dependencies": { "left-pad": { "version": "1.0.0" } }
}"#;
        let patched = patcher()
            .patch_content(MetadataFormat::Npm, package, Version::new(2, 0, 0))
            .unwrap();
        assert!(patched.contains(r#""version": "2.0.0""#));
        assert!(patched.contains(r#"{ "version": "1.0.0" }"#));
    }

    #[test]
    fn test_patch_npm_skips_nested_version_before_top_level() {
        let package = r#"{
  "name": "widget",
  "engines": { "node": ">=18", "version": "0.0.0" },
  "description": "braces { in } strings",
  "version": "0.0.1"
}"#;
        let patched = patcher()
            .patch_content(MetadataFormat::Npm, package, Version::new(1, 2, 0))
            .unwrap();
        assert!(patched.contains(r#""engines": { "node": ">=18", "version": "0.0.0" }"#));
        assert!(patched.contains(r#""version": "1.2.0"
}"#));
    }

    #[test]
    fn test_patch_npm_without_top_level_version() {
        let package = r#"{ "name": "w", "config": { "version": "3.0.0" } }"#;
        let patched = patcher()
            .patch_content(MetadataFormat::Npm, package, Version::new(1, 0, 0))
            .unwrap();
        assert_eq!(patched, package);
    }

    #[test]
    fn test_json_depth_ignores_string_contents() {
        assert_eq!(json_depth(r#"{ "a": "}}" , "#), 1);
        assert_eq!(json_depth(r#"{ "a": { "b": "\"{" , "#), 2);
        assert_eq!(json_depth(""), 0);
    }

    #[test]
    fn test_patch_msbuild_only_first_plain_group() {
        let project = "\
<Project Sdk=\"Microsoft.NET.Sdk\">
  <PropertyGroup Condition=\"'$(Configuration)' == 'Release'\">
    <Version>9.9.9</Version>
  </PropertyGroup>
  <PropertyGroup>
    <Version>1.0.0</Version>
  </PropertyGroup>
  <PropertyGroup>
    <FileVersion>1.0.0.0</FileVersion>
  </PropertyGroup>
</Project>
";
        let patched = patcher()
            .patch_content(MetadataFormat::MsBuild, project, Version::new(2, 3, 4))
            .unwrap();

        assert!(patched.contains("Release'\">\n    <Version>9.9.9</Version>"));
        assert!(patched.contains("<Version>2.3.4</Version>"));
        assert!(patched.contains("<FileVersion>1.0.0.0</FileVersion>"));
        assert_eq!(patched.matches("<FileVersion>2.3.4.0</FileVersion>").count(), 1);
        assert_eq!(patched.matches("<PropertyGroup>").count(), 2);
    }

    #[test]
    fn test_patch_msbuild_existing_and_missing_elements() {
        let project = "\
<Project Sdk=\"Microsoft.NET.Sdk\">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>1.0.0</Version>
  </PropertyGroup>
</Project>
";
        let patched = patcher()
            .patch_content(MetadataFormat::MsBuild, project, Version::new(2, 3, 4))
            .unwrap();

        assert!(patched.contains("<Version>2.3.4</Version>"));
        assert!(patched.contains("<AssemblyVersion>2.0.0</AssemblyVersion>"));
        assert!(patched.contains("<FileVersion>2.3.4.0</FileVersion>"));
        assert!(patched.contains("<InformationalVersion>2.3.4</InformationalVersion>"));
        assert_eq!(patched.matches("<PropertyGroup>").count(), 1);
    }

    #[test]
    fn test_patch_msbuild_without_property_group() {
        let project = "<Project Sdk=\"Microsoft.NET.Sdk\">\n</Project>\n";
        let patched = patcher()
            .patch_content(MetadataFormat::MsBuild, project, Version::new(1, 0, 0))
            .unwrap();
        assert!(patched.contains("  <PropertyGroup>\n    <Version>1.0.0</Version>\n"));
        assert!(patched.trim_end().ends_with("</Project>"));
    }

    #[test]
    fn test_patch_msbuild_rejects_non_project() {
        let result =
            patcher().patch_content(MetadataFormat::MsBuild, "<foo/>", Version::new(1, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_assembly_info() {
        let source = "\
// Copyright
using System.Reflection;
[assembly: AssemblyVersion(\"1.0.0.0\")]
[assembly : AssemblyFileVersion( \"1.0.0.0\" )]
[assembly: AssemblyInformationalVersion(\"1.0.0\")]
";
        let patched = patcher()
            .patch_content(MetadataFormat::AssemblyInfo, source, Version::new(3, 1, 2))
            .unwrap();

        assert!(patched.starts_with("// Copyright\n"));
        assert!(patched.contains("[assembly: AssemblyVersion(\"3.0.0.0\")]"));
        assert!(patched.contains("[assembly: AssemblyFileVersion(\"3.1.2.0\")]"));
        assert!(patched.contains("[assembly: AssemblyInformationalVersion(\"3.1.2\")]"));
    }

    #[test]
    fn test_patch_file_reports_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, "[package]\nname = \"w\"\nversion = \"0.1.0\"\n").unwrap();

        let patcher = patcher();
        assert!(patcher.patch_file(&path, Version::new(1, 0, 0)).unwrap());
        assert!(!patcher.patch_file(&path, Version::new(1, 0, 0)).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("version = \"1.0.0\""));
    }

    #[test]
    fn test_patch_file_ignores_unknown_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "version = \"0.1.0\"").unwrap();
        assert!(!patcher().patch_file(&path, Version::new(1, 0, 0)).unwrap());
    }
}
