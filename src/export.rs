//! SVG to PNG/PDF conversion and file output.

use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};

/// Output format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Svg => "SVG",
            OutputFormat::Png => "PNG",
            OutputFormat::Pdf => "PDF",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Export(format!("{} has no extension", path.display())))?
            .to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(Error::Export(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                other
            ))),
        }
    }
}

/// Convert `svg` as needed and write it to `path`.
pub fn write_output(svg: &str, path: &Path, png_scale: f32) -> Result<OutputFormat> {
    let format = OutputFormat::from_path(path)?;
    let bytes = match format {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Png => svg_to_png(svg, png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(svg)?,
    };
    std::fs::write(path, bytes)
        .map_err(|e| Error::Export(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(format)
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Export(format!("Invalid PNG scale: {}", scale)));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        load_fonts(fontdb);
        let fallbacks = FontFallbacks::pick(
            fontdb
                .faces()
                .flat_map(|face| face.families.iter().map(|(family, _)| family.clone())),
        );
        if let Some(family) = &fallbacks.sans {
            fontdb.set_sans_serif_family(family);
        }
        if let Some(family) = &fallbacks.serif {
            fontdb.set_serif_family(family);
        }
        if let Some(family) = &fallbacks.mono {
            fontdb.set_monospace_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Export(format!("Failed to create {}x{} pixmap", width, height)))?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::Export(format!("Failed to encode PNG: {}", e)))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        db.load_fonts_dir(local_fonts);
    }
    let fallbacks = FontFallbacks::pick(
        db.faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone())),
    );
    if let Some(family) = &fallbacks.sans {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = &fallbacks.serif {
        db.set_serif_family(family);
    }
    if let Some(family) = &fallbacks.mono {
        db.set_monospace_family(family);
    }

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(db);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    // Text as paths: labels survive viewers without the font.
    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::Export(format!("Failed to convert SVG to PDF: {}", e)))
}

fn load_fonts(fontdb: &mut usvg::fontdb::Database) {
    fontdb.load_system_fonts();
    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }
    log::debug!("{} font faces available for export", fontdb.len());
}

/// Generic family names resolved against whatever fonts are installed.
#[derive(Debug, Default, PartialEq)]
struct FontFallbacks {
    sans: Option<String>,
    serif: Option<String>,
    mono: Option<String>,
}

impl FontFallbacks {
    /// First family whose name says sans/serif/mono, else the first family
    /// seen. Monospace falls back to the sans pick before the first family.
    fn pick(families: impl IntoIterator<Item = String>) -> Self {
        let mut first = None;
        let mut sans = None;
        let mut serif = None;
        let mut mono = None;

        for family in families {
            let lower = family.to_ascii_lowercase();
            if sans.is_none() && lower.contains("sans") {
                sans = Some(family.clone());
            }
            if serif.is_none() && lower.contains("serif") {
                serif = Some(family.clone());
            }
            if mono.is_none() && (lower.contains("mono") || lower.contains("code")) {
                mono = Some(family.clone());
            }
            if first.is_none() {
                first = Some(family);
            }
        }

        Self {
            mono: mono.or_else(|| sans.clone()).or_else(|| first.clone()),
            sans: sans.or_else(|| first.clone()),
            serif: serif.or(first),
        }
    }
}
