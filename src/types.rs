//! CFI data model
//!
//! EPUB CFI is a standardized way to reference locations within EPUB
//! publications. Format: `epubcfi(/6/4[chap01ref]!/4/2/22/3:268)`
//!
//! Reference: <https://idpf.org/epub/linking/cfi/epub-cfi.html>

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::escape::escape;

/// A single step in a CFI path: `/index[id]:offset`
///
/// Even indices address element children (`index / 2` is the 1-based
/// ordinal among elements); odd indices address the character data
/// between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Child index. Engine-generated output always uses even indices for
    /// elements and odd indices for text positions.
    pub index: u32,
    /// Optional ID assertion `[id]`, stored unescaped
    pub id: Option<String>,
    /// Optional character offset `:n` (meaningful on a terminal step)
    pub offset: Option<u32>,
    /// Optional temporal offset `~t` in seconds (audio/video)
    pub temporal: Option<f64>,
    /// Optional spatial offset `@x:y` (images)
    pub spatial: Option<(f64, f64)>,
    /// Optional trailing assertion, stored unescaped and never interpreted
    pub assertion: Option<String>,
}

// The float fields only ever hold values produced by the parser, which
// rejects non-numeric input, so NaN cannot occur.
impl Eq for Step {}

/// One leg of a CFI path: the steps between two indirections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Steps in this segment
    pub steps: Vec<Step>,
}

/// Start and end tails of a range CFI, each relative to the shared
/// parent formed by the steps before the first comma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfiRange {
    /// Steps from the shared parent to the range start
    pub start: Segment,
    /// Steps from the shared parent to the range end
    pub end: Segment,
}

/// A complete parsed CFI
///
/// Immutable once parsed: produced, read, and discarded per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cfi {
    /// Path segments, separated by `!` in serialized form. Each segment
    /// resolves against a tree root supplied by the caller.
    pub segments: Vec<Segment>,
    /// Optional range tails attached to the final segment
    pub range: Option<CfiRange>,
}

impl Step {
    /// Create a bare step with no assertions or offsets
    pub fn new(index: u32) -> Self {
        Self {
            index,
            id: None,
            offset: None,
            temporal: None,
            spatial: None,
            assertion: None,
        }
    }

    /// Create a step with an ID assertion
    pub fn with_id(index: u32, id: impl Into<String>) -> Self {
        let mut step = Self::new(index);
        step.id = Some(id.into());
        step
    }

    /// Whether this step addresses an element child (even index)
    pub fn is_element(&self) -> bool {
        self.index % 2 == 0
    }

    /// 1-based position among element-type children (`index / 2`)
    pub fn ordinal(&self) -> u32 {
        self.index / 2
    }
}

impl Segment {
    /// Create an empty segment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a segment from steps
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Add a step to the segment
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// The final step, if any
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

impl Cfi {
    /// Create a point CFI from path segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            range: None,
        }
    }

    /// Create a range CFI
    pub fn with_range(segments: Vec<Segment>, range: CfiRange) -> Self {
        Self {
            segments,
            range: Some(range),
        }
    }

    /// Check if this CFI encodes a start/end range
    pub fn is_range(&self) -> bool {
        self.range.is_some()
    }

    /// Reduce a range CFI to a point CFI by appending the chosen tail's
    /// steps to the final segment. Point CFIs are returned unchanged.
    pub fn collapse(&self, to_end: bool) -> Cfi {
        let Some(range) = &self.range else {
            return self.clone();
        };
        let tail = if to_end { &range.end } else { &range.start };
        let mut segments = self.segments.clone();
        match segments.last_mut() {
            Some(last) => last.steps.extend(tail.steps.iter().cloned()),
            None => segments.push(tail.clone()),
        }
        Cfi::new(segments)
    }

    /// Serialize to CFI text, optionally wrapped in `epubcfi(...)`
    pub fn serialize(&self, wrap: bool) -> String {
        let mut inner = self
            .segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("!");
        if let Some(range) = &self.range {
            inner.push(',');
            inner.push_str(&range.start.to_string());
            inner.push(',');
            inner.push_str(&range.end.to_string());
        }
        if wrap {
            format!("epubcfi({inner})")
        } else {
            inner
        }
    }
}

// Display implementations for serialization

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.index)?;
        if let Some(id) = &self.id {
            write!(f, "[{}]", escape(id))?;
        }
        if let Some(offset) = self.offset {
            write!(f, ":{}", offset)?;
        }
        if let Some(temporal) = self.temporal {
            write!(f, "~{}", temporal)?;
        }
        if let Some((x, y)) = self.spatial {
            write!(f, "@{}:{}", x, y)?;
        }
        if let Some(assertion) = &self.assertion {
            write!(f, "[{}]", escape(assertion))?;
        }
        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for Cfi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize(true))
    }
}
