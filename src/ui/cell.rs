//! Column definitions and per-cell formatting

use std::path::{Path, PathBuf};

use crate::fs::DirectoryEntry;

/// Width reserved at the start of a name cell for the icon and a gap
pub const ICON_WIDTH: u16 = 2;

/// Glyph shown for directories
pub const DIRECTORY_GLYPH: char = '▸';

/// Glyph shown when a thumbnail is available
pub const THUMBNAIL_GLYPH: char = '◩';

/// The closed set of columns a row can show
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ColumnKind {
    Name,
    Size,
    Extension,
}

/// Static description of one column
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub kind: ColumnKind,
    /// Preferred width in cells
    pub width: u16,
}

/// Columns in display order
pub const COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec { label: "Name", kind: ColumnKind::Name, width: 28 },
    ColumnSpec { label: "Size", kind: ColumnKind::Size, width: 12 },
    ColumnSpec { label: "Type", kind: ColumnKind::Extension, width: 10 },
];

/// Distribute `total` cells over the columns. Fixed columns keep their width;
/// the name column gets whatever is left, but never less than its own width
/// unless the total is smaller than that.
pub fn column_widths(total: u16) -> Vec<u16> {
    let fixed: u16 = COLUMNS
        .iter()
        .filter(|c| c.kind != ColumnKind::Name)
        .map(|c| c.width)
        .sum();
    let name_width = total.saturating_sub(fixed).max(COLUMNS[0].width.min(total));
    COLUMNS
        .iter()
        .map(|c| match c.kind {
            ColumnKind::Name => name_width,
            _ => c.width,
        })
        .collect()
}

/// Turns a local thumbnail path into something the host can load
pub trait AssetResolver {
    fn resolve(&self, path: &Path) -> String;
}

/// Resolves local files to `file://` URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct FileUrlResolver;

impl AssetResolver for FileUrlResolver {
    fn resolve(&self, path: &Path) -> String {
        format!("file://{}", path.display())
    }
}

/// Everything a cell needs besides the entry itself
pub struct CellContext<'a> {
    pub location_id: i64,
    /// Client data directory; thumbnails are suppressed without it
    pub data_path: Option<&'a Path>,
    pub resolver: &'a dyn AssetResolver,
}

/// Icon shown in front of a name
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellIcon {
    Directory,
    /// Loadable reference to the thumbnail image
    Thumbnail(String),
}

impl CellIcon {
    pub fn glyph(&self) -> char {
        match self {
            CellIcon::Directory => DIRECTORY_GLYPH,
            CellIcon::Thumbnail(_) => THUMBNAIL_GLYPH,
        }
    }
}

/// One materialized cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellView {
    pub kind: ColumnKind,
    pub icon: Option<CellIcon>,
    pub text: String,
}

impl CellView {
    pub fn empty(kind: ColumnKind) -> Self {
        Self { kind, icon: None, text: String::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.icon.is_none() && self.text.is_empty()
    }
}

/// Render one cell of `entry` for the given column
pub fn render_cell(kind: ColumnKind, entry: &DirectoryEntry, width: u16, ctx: &CellContext) -> CellView {
    match kind {
        ColumnKind::Name => render_name(entry, width, ctx),
        ColumnKind::Size => match entry.size_in_bytes {
            Some(bytes) => CellView { kind, icon: None, text: format_size(bytes) },
            None => CellView::empty(kind),
        },
        ColumnKind::Extension => CellView { kind, icon: None, text: entry.extension.clone() },
    }
}

fn render_name(entry: &DirectoryEntry, width: u16, ctx: &CellContext) -> CellView {
    if entry.name.is_empty() {
        return CellView::empty(ColumnKind::Name);
    }

    let icon = if entry.is_dir {
        Some(CellIcon::Directory)
    } else {
        thumbnail_path(entry, ctx).map(|path| CellIcon::Thumbnail(ctx.resolver.resolve(&path)))
    };

    let text_width = width.saturating_sub(ICON_WIDTH) as usize;
    CellView {
        kind: ColumnKind::Name,
        icon,
        text: truncate_name(&entry.name, text_width),
    }
}

/// Location of the generated thumbnail for an entry, if it has one and the
/// client data directory is known
pub fn thumbnail_path(entry: &DirectoryEntry, ctx: &CellContext) -> Option<PathBuf> {
    if !entry.has_local_thumbnail {
        return None;
    }
    let data_path = ctx.data_path?;
    let checksum = entry.temp_checksum.as_deref().filter(|c| !c.is_empty())?;
    Some(
        data_path
            .join("thumbnails")
            .join(ctx.location_id.to_string())
            .join(format!("{}.webp", checksum)),
    )
}

/// Format a byte count with decimal units, three significant digits
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    let mut exponent = 0;
    let mut divisor: u64 = 1;
    while bytes / divisor >= 1000 && exponent < UNITS.len() - 1 {
        divisor *= 1000;
        exponent += 1;
    }

    if exponent == 0 {
        return format!("{} B", bytes);
    }

    let value = bytes as f64 / divisor as f64;
    let digits = if value >= 100.0 {
        format!("{:.0}", value)
    } else if value >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    };
    let digits = if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits.as_str()
    };
    format!("{} {}", digits, UNITS[exponent])
}

/// Truncate a name to fit within max_width (keeps the beginning)
pub fn truncate_name(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        name.to_string()
    } else if max_width <= 3 {
        name.chars().take(max_width).collect()
    } else {
        let mut result: String = name.chars().take(max_width - 1).collect();
        result.push('…');
        result
    }
}
