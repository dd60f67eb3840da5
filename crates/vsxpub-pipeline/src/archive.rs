//! Packaged-extension archive access
//!
//! Artifacts are zip files. Entries are read with the `zip` crate on the
//! blocking pool; this module knows which entries to ask for and how to
//! interpret them.

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use vsxpub_core::types::{Manifest, PackageManifest, XmlManifest};
use zip::result::ZipError;
use zip::ZipArchive;

/// Binary package manifest inside an artifact
pub const PACKAGE_MANIFEST_ENTRY: &str = "extension/package.json";

/// Legacy XML manifest inside an artifact
pub const XML_MANIFEST_ENTRY: &str = "extension.vsixmanifest";

static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Identity\b([^>]*)/?>").unwrap());
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*"([^"]*)""#).unwrap());
static LICENSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<License\b[^>]*>(.*?)</License>").unwrap());

/// Reads single entries out of a packaged artifact
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// Contents of `entry`, or `None` when the archive has no such entry
    async fn read_entry(&self, archive: &Path, entry: &str) -> Result<Option<String>>;
}

/// `ArchiveReader` over zip files
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveReader;

impl ZipArchiveReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveReader for ZipArchiveReader {
    async fn read_entry(&self, archive: &Path, entry: &str) -> Result<Option<String>> {
        let archive = archive.to_path_buf();
        let entry = entry.to_string();
        tokio::task::spawn_blocking(move || read_zip_entry(&archive, &entry)).await?
    }
}

fn read_zip_entry(archive: &Path, entry: &str) -> Result<Option<String>> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut file = match zip.by_name(entry) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Read and merge both manifest forms of an artifact
pub async fn read_manifest(reader: &dyn ArchiveReader, archive: &Path) -> Result<Manifest> {
    let package = match reader.read_entry(archive, PACKAGE_MANIFEST_ENTRY).await? {
        Some(content) => Some(serde_json::from_str::<PackageManifest>(&content)?),
        None => None,
    };

    let xml = reader
        .read_entry(archive, XML_MANIFEST_ENTRY)
        .await?
        .map(|content| parse_xml_manifest(&content));

    debug!(
        "Manifest forms in {:?}: package.json={}, vsixmanifest={}",
        archive,
        package.is_some(),
        xml.is_some()
    );

    Ok(Manifest::merge(package, xml))
}

/// Extract identity and license from `extension.vsixmanifest`
///
/// Only `PackageManifest/Metadata/Identity` attributes and the `License`
/// element are needed, so a couple of patterns are enough here.
pub fn parse_xml_manifest(xml: &str) -> XmlManifest {
    let mut manifest = XmlManifest::default();

    if let Some(identity) = IDENTITY_RE.captures(xml) {
        for attr in ATTRIBUTE_RE.captures_iter(&identity[1]) {
            let value = Some(unescape(&attr[2]));
            match &attr[1] {
                "Publisher" => manifest.publisher = value,
                "Id" => manifest.id = value,
                "Version" => manifest.version = value,
                _ => {}
            }
        }
    }

    manifest.license = LICENSE_RE
        .captures(xml)
        .map(|c| unescape(c[1].trim()))
        .filter(|l| !l.is_empty());

    manifest
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
