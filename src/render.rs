//! Text rendering of decoded layers.
//!
//! Every decoded header implements [`Layer`]. Rendering walks a layer and its
//! children and produces one [`Section`] per layer, in order. A section prints
//! as:
//!
//! ```text
//! TAG: \t----- Title -----
//! TAG: \t
//! TAG: \t<field line>
//! TAG: \t
//! ```
use std::fmt;

/// A decoded header that can be rendered as a report section.
pub trait Layer {
    /// Short tag printed at the start of every line of the section.
    fn tag(&self) -> &'static str;

    /// Title shown in the section banner.
    fn title(&self) -> &'static str;

    /// One rendered line per field or annotation, in display order.
    fn fields(&self) -> Vec<String>;

    /// The layer encapsulated by this one, if any.
    fn child(&self) -> Option<&dyn Layer> {
        None
    }
}

/// One rendered layer.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Section {
    tag: &'static str,
    title: &'static str,
    lines: Vec<String>,
}

impl Section {
    /// Render a single layer, ignoring its children.
    #[must_use]
    pub fn new(layer: &dyn Layer) -> Self {
        Self {
            tag: layer.tag(),
            title: layer.title(),
            lines: layer.fields(),
        }
    }

    /// The section's line tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The section's title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// The field lines, without tag or banner.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag;
        writeln!(f, "{tag}: \t----- {} -----", self.title)?;
        writeln!(f, "{tag}: \t")?;
        for line in &self.lines {
            writeln!(f, "{tag}: \t{line}")?;
        }
        writeln!(f, "{tag}: \t")
    }
}

/// Render `layer` and everything it encapsulates, outermost first.
#[must_use]
pub fn sections(layer: &dyn Layer) -> Vec<Section> {
    let mut out = vec![Section::new(layer)];
    let mut next = layer.child();
    while let Some(child) = next {
        out.push(Section::new(child));
        next = child.child();
    }
    out
}

/// A complete report: the sections of every decoded layer of a frame.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    /// Create a new [`Report`] from already rendered sections.
    #[inline]
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// The rendered sections, outermost layer first.
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sections.iter().try_for_each(|section| section.fmt(f))
    }
}

/// Pad a label to `width` columns so the `=` signs of a section line up.
pub(crate) fn field(label: &str, width: usize, value: impl fmt::Display) -> String {
    format!("{label:<width$} = {value}")
}
