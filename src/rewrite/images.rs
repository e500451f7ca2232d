use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};

use super::url_path;
use crate::attachments::AttachmentManifest;
use crate::config::MigrationConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::diagram::{decode_png_payload, store_embedded_png};
use crate::error::Result;

const DIAGRAM_IMAGE_CLASS: &str = "drawio-diagram-image";
const EXPORT_IMAGES_PREFIX: &str = "images/";

/// An `<img>` tag with `src` in any attribute position
fn img_tag_regex() -> Regex {
    Regex::new(r#"(?is)<img\s(?:[^>]*?\s)?src="([^"]*)"[^>]*>"#).unwrap()
}

/// The page whose image references are being rewritten
pub struct ImageContext<'a> {
    pub source_root: &'a Path,
    pub target_root: &'a Path,
    /// Page path relative to the target root without extension, also its
    /// attachment folder under `attachments_dir`
    pub page: &'a str,
    /// The page's attachments after copying, if it has any
    pub manifest: Option<&'a AttachmentManifest>,
    pub config: &'a MigrationConfig,
}

impl ImageContext<'_> {
    fn attachment_dir(&self) -> PathBuf {
        self.target_root
            .join(&self.config.attachments_dir)
            .join(self.page)
    }

    /// Markdown for a file under the target root
    fn reference(&self, name: &str, destination: &Path) -> String {
        let relative = destination.strip_prefix(self.target_root).unwrap_or(destination);
        let link = url_path(relative);
        if link.ends_with(&self.config.diagram_suffix) {
            format!("```{{drawio-image}} /{}\n```", link)
        } else {
            format!("![{}](/{})", name, link)
        }
    }
}

/// Export chrome such as emoticons: keep the tag, make it root-relative and
/// bring the file along.
fn rewrite_export_image(tag: &str, src: &str, ctx: &ImageContext<'_>, diagnostics: &mut Diagnostics) -> Result<String> {
    let source = ctx.source_root.join(src);
    if source.is_file() {
        let target = ctx.target_root.join(src);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &target)?;
    } else {
        diagnostics.warn(Warning::UnresolvedAttachmentReference {
            page: ctx.page.to_string(),
            reference: src.to_string(),
        });
    }
    Ok(tag.replacen("src=\"images", "src=\"/images", 1))
}

/// Inline diagram rendering carried as a data URI
fn rewrite_embedded_diagram(
    tag: &str,
    src: &str,
    ctx: &ImageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let Some(bytes) = decode_png_payload(src, ctx.page, diagnostics) else {
        return Ok(tag.to_string());
    };
    let empty = AttachmentManifest::new(ctx.page);
    let manifest = ctx.manifest.unwrap_or(&empty);
    let image = store_embedded_png(&bytes, manifest, ctx.source_root, &ctx.attachment_dir())?;
    Ok(ctx.reference(image.name(), image.path()))
}

/// Reference to an uploaded attachment by its storage path
fn rewrite_attachment(tag: &str, src: &str, ctx: &ImageContext<'_>, diagnostics: &mut Diagnostics) -> String {
    let resolved = ctx
        .manifest
        .and_then(|m| m.find_by_storage_path(src))
        .and_then(|a| a.destination.as_deref().map(|d| (a.meaningful_name.as_str(), d)));

    match resolved {
        Some((name, destination)) => ctx.reference(name, destination),
        None => {
            diagnostics.warn(Warning::UnresolvedAttachmentReference {
                page: ctx.page.to_string(),
                reference: src.to_string(),
            });
            tag.to_string()
        }
    }
}

/// Replace `<img>` tags with markdown pointing at migrated files.
///
/// Export chrome under `images/` keeps its tag with a root-relative source.
/// Inline diagram renderings are matched against the page's PNG uploads or
/// written out as new files. Other sources are looked up among the page's
/// attachments. Tags that cannot be resolved are left as they are.
pub fn rewrite_image_references(
    text: &str,
    ctx: &ImageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in img_tag_regex().captures_iter(text) {
        let (tag, src) = tag_and_src(&caps);
        let start = caps.get(0).map(|m| m.start()).unwrap_or(last);
        output.push_str(&text[last..start]);

        let replacement = if src.starts_with(EXPORT_IMAGES_PREFIX) {
            rewrite_export_image(tag, src, ctx, diagnostics)?
        } else if tag.contains(DIAGRAM_IMAGE_CLASS) {
            rewrite_embedded_diagram(tag, src, ctx, diagnostics)?
        } else {
            rewrite_attachment(tag, src, ctx, diagnostics)
        };
        output.push_str(&replacement);
        last = start + tag.len();
    }

    output.push_str(&text[last..]);
    Ok(output)
}

fn tag_and_src<'t>(caps: &Captures<'t>) -> (&'t str, &'t str) {
    let tag = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    let src = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    (tag, src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use tempfile::TempDir;

    struct Fixture {
        source: TempDir,
        target: TempDir,
        config: MigrationConfig,
        manifest: AttachmentManifest,
    }

    impl Fixture {
        fn new() -> Self {
            let source = TempDir::new().unwrap();
            let target = TempDir::new().unwrap();
            fs::create_dir_all(source.path().join("attachments/42")).unwrap();
            fs::write(source.path().join("attachments/42/7.png"), b"uploaded png").unwrap();

            let mut manifest = AttachmentManifest::new("Home");
            let shot = manifest.entry("shot.png");
            shot.add_file("image/png", "attachments/42/7.png");
            shot.destination = Some(target.path().join("attachments/Home/shot.png"));
            let diagram = manifest.entry("network");
            diagram.add_file("application/vnd.jgraph.mxfile", "attachments/42/8");
            diagram.destination = Some(target.path().join("Section/network.drawio.xml"));

            Self {
                source,
                target,
                config: MigrationConfig::default(),
                manifest,
            }
        }

        fn rewrite(&self, text: &str, diagnostics: &mut Diagnostics) -> String {
            let ctx = ImageContext {
                source_root: self.source.path(),
                target_root: self.target.path(),
                page: "Home",
                manifest: Some(&self.manifest),
                config: &self.config,
            };
            rewrite_image_references(text, &ctx, diagnostics).unwrap()
        }
    }

    #[test]
    fn test_attachment_references() {
        let fx = Fixture::new();
        let mut diagnostics = Diagnostics::new();
        let out = fx.rewrite(
            "Before <img src=\"attachments/42/7.png\" class=\"confluence-embedded-image\" /> after\n\
             <img src=\"attachments/42/8\" />\n",
            &mut diagnostics,
        );

        assert_eq!(
            out,
            "Before ![shot.png](/attachments/Home/shot.png) after\n```{drawio-image} /Section/network.drawio.xml\n```\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_export_images_are_copied() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.source.path().join("images/icons")).unwrap();
        fs::write(fx.source.path().join("images/icons/smile.png"), b":)").unwrap();
        let mut diagnostics = Diagnostics::new();

        let out = fx.rewrite("<img src=\"images/icons/smile.png\" alt=\"(smile)\" />", &mut diagnostics);

        assert_eq!(out, "<img src=\"/images/icons/smile.png\" alt=\"(smile)\" />");
        assert_eq!(fs::read(fx.target.path().join("images/icons/smile.png")).unwrap(), b":)");
    }

    #[test]
    fn test_embedded_diagram_images() {
        let fx = Fixture::new();
        let mut diagnostics = Diagnostics::new();
        let known = BASE64.encode(b"uploaded png");
        let fresh = BASE64.encode(b"new rendering");
        let text = format!(
            "<img src=\"data:image/png;base64,{}\" class=\"drawio-diagram-image\" />\n\
             <img src=\"data:image/png;base64,{}\" class=\"drawio-diagram-image\" />\n",
            known, fresh
        );

        let out = fx.rewrite(&text, &mut diagnostics);

        assert_eq!(
            out,
            "![shot.png](/attachments/Home/shot.png)\n![auto_generated_0.png](/attachments/Home/auto_generated_0.png)\n"
        );
        assert_eq!(
            fs::read(fx.target.path().join("attachments/Home/auto_generated_0.png")).unwrap(),
            b"new rendering"
        );
    }

    #[test]
    fn test_src_after_other_attributes() {
        let fx = Fixture::new();
        let mut diagnostics = Diagnostics::new();
        let text = format!(
            "<img class=\"confluence-embedded-image\" width=\"300\" src=\"attachments/42/7.png\" />\n\
             <img class=\"drawio-diagram-image\"\n  src=\"data:image/png;base64,{}\" />\n<imgsrc=\"attachments/42/7.png\">\n",
            BASE64.encode(b"uploaded png")
        );

        let out = fx.rewrite(&text, &mut diagnostics);

        assert_eq!(
            out,
            "![shot.png](/attachments/Home/shot.png)\n![shot.png](/attachments/Home/shot.png)\n<imgsrc=\"attachments/42/7.png\">\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unresolved_references_are_kept() {
        let fx = Fixture::new();
        let mut diagnostics = Diagnostics::new();
        let text = "<img src=\"attachments/99/1.png\" />\n<img src=\"https://x/y.svg\" class=\"drawio-diagram-image\" />\n";

        let out = fx.rewrite(text, &mut diagnostics);

        assert_eq!(out, text);
        assert_eq!(diagnostics.count("unresolved-attachment-reference"), 1);
        assert_eq!(diagnostics.count("unencoded-payload"), 1);
    }
}
