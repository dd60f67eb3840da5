//! Plan command

use anyhow::Result;
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};
use vsxpub_core::types::ExtensionDescriptor;

use super::load_catalogue;
use crate::cli::PlanArgs;
use crate::output;

#[derive(Tabled)]
struct PlanRow {
    extension: String,
    strategy: String,
    targets: String,
    source: String,
}

pub fn run(args: PlanArgs, catalogue_path: &Utf8Path) -> Result<i32> {
    let catalogue = load_catalogue(catalogue_path)?;
    let selected = catalogue.select(&args.extensions)?;

    if selected.is_empty() {
        output::info("The catalogue is empty");
        return Ok(0);
    }

    let rows: Vec<PlanRow> = selected
        .into_iter()
        .map(|(id, descriptor)| PlanRow {
            extension: id.to_string(),
            strategy: descriptor.strategy().to_string(),
            targets: targets(descriptor),
            source: source(descriptor),
        })
        .collect();

    output::header(&format!("Build plan ({})", catalogue_path));
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(0)
}

fn targets(descriptor: &ExtensionDescriptor) -> String {
    if let Some(downloads) = descriptor.downloads.as_ref().filter(|d| !d.is_empty()) {
        return downloads.keys().cloned().collect::<Vec<_>>().join(", ");
    }

    let enabled = descriptor.enabled_targets();
    if enabled.is_empty() {
        "universal".to_string()
    } else {
        enabled
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn source(descriptor: &ExtensionDescriptor) -> String {
    match &descriptor.repository {
        Some(repository) => format!("{}@{}", repository, descriptor.resolved_ref()),
        None => descriptor
            .version
            .as_deref()
            .map(|v| format!("downloads {}", v))
            .unwrap_or_else(|| "downloads".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsxpub_core::Catalogue;

    const CATALOGUE: &str = r#"{
        "redhat.java": {
            "repository": "https://github.com/redhat-developer/vscode-java",
            "version": "1.22.0"
        },
        "rust-lang.rust-analyzer": {
            "repository": "https://github.com/rust-lang/rust-analyzer",
            "custom": ["cargo xtask dist"],
            "target": { "linux-x64": true, "win32-x64": false, "darwin-arm64": {} }
        },
        "acme.prebuilt": {
            "version": "2.0.0",
            "downloads": { "linux-x64": "https://releases.test/a.vsix" }
        }
    }"#;

    #[test]
    fn test_targets_column() {
        let catalogue = Catalogue::from_json(CATALOGUE).unwrap();

        assert_eq!(targets(catalogue.get("redhat.java").unwrap()), "universal");
        assert_eq!(
            targets(catalogue.get("rust-lang.rust-analyzer").unwrap()),
            "darwin-arm64, linux-x64"
        );
        assert_eq!(targets(catalogue.get("acme.prebuilt").unwrap()), "linux-x64");
    }

    #[test]
    fn test_source_column() {
        let catalogue = Catalogue::from_json(CATALOGUE).unwrap();

        assert_eq!(
            source(catalogue.get("redhat.java").unwrap()),
            "https://github.com/redhat-developer/vscode-java@v1.22.0"
        );
        assert_eq!(
            source(catalogue.get("acme.prebuilt").unwrap()),
            "downloads 2.0.0"
        );
    }
}
