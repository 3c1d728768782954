//! Byte-range sets tying parsed entities back to the original source.
//!
//! Every block the lexer emits, and every annotation the parser records,
//! carries a [`SourceMap`]: a sorted set of half-open byte ranges into the
//! source buffer. Ranges compose by union; slicing the source with a map
//! reproduces the exact text the entity came from.

/// A half-open byte range `[location, location + length)` into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteRange {
    pub location: usize,
    pub length: usize,
}

impl ByteRange {
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    pub fn end(self) -> usize {
        self.location + self.length
    }

    pub fn is_empty(self) -> bool {
        self.length == 0
    }
}

/// A sorted, coalesced set of byte ranges.
///
/// Ranges are appended in document order; adjacent and overlapping ranges
/// merge so the set stays minimal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    ranges: Vec<ByteRange>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(location: usize, length: usize) -> Self {
        let mut map = Self::new();
        map.append(ByteRange::new(location, length));
        map
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of bytes covered.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.length).sum()
    }

    /// First covered byte offset, if any. Used to order annotations in
    /// document order.
    pub fn first_location(&self) -> Option<usize> {
        self.ranges.first().map(|r| r.location)
    }

    /// Adds a range, merging with the previous one when they touch.
    ///
    /// Out-of-order appends fall back to insertion sort; in practice the
    /// lexer and parsers append in document order.
    pub fn append(&mut self, range: ByteRange) {
        if range.is_empty() {
            return;
        }
        match self.ranges.last_mut() {
            Some(last) if last.end() >= range.location => {
                let end = last.end().max(range.end());
                if range.location >= last.location {
                    last.length = end - last.location;
                    return;
                }
                // fall through to the sorted insert below
            }
            Some(last) if last.end() < range.location => {
                self.ranges.push(range);
                return;
            }
            Some(_) => {}
            None => {
                self.ranges.push(range);
                return;
            }
        }
        let idx = self
            .ranges
            .partition_point(|r| r.location <= range.location);
        self.ranges.insert(idx, range);
        self.normalize();
    }

    /// Unions another map into this one.
    pub fn extend(&mut self, other: &SourceMap) {
        for range in &other.ranges {
            self.append(*range);
        }
    }

    /// Intersects the set with a window, keeping the overlapping parts.
    pub fn intersect(&self, window: ByteRange) -> SourceMap {
        let mut out = SourceMap::new();
        for range in &self.ranges {
            let start = range.location.max(window.location);
            let end = range.end().min(window.end());
            if start < end {
                out.append(ByteRange::new(start, end - start));
            }
        }
        out
    }

    /// Maps the set back to the original source, concatenating the covered
    /// slices. Ranges are clamped to the buffer.
    pub fn map_source(&self, source: &str) -> String {
        let mut out = String::with_capacity(self.len());
        for range in &self.ranges {
            let start = range.location.min(source.len());
            let end = range.end().min(source.len());
            out.push_str(&source[start..end]);
        }
        out
    }

    fn normalize(&mut self) {
        self.ranges.sort_by_key(|r| r.location);
        let mut merged: Vec<ByteRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if last.end() >= range.location => {
                    let end = last.end().max(range.end());
                    last.length = end - last.location;
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

// ── AST-shaped source-map tree ──
//
// Mirrors the Blueprint AST with a SourceMap at every leaf the parser fills
// in. Populated on every parse, surfaced through ParseResult only when the
// ExportSourcemap option is set.

#[derive(Debug, Clone, Default)]
pub struct BlueprintSourceMap {
    pub name: SourceMap,
    pub description: SourceMap,
    pub metadata: Vec<SourceMap>,
    pub resource_groups: Vec<ResourceGroupSourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceGroupSourceMap {
    pub name: SourceMap,
    pub description: SourceMap,
    pub resources: Vec<ResourceSourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceSourceMap {
    pub name: SourceMap,
    pub uri_template: SourceMap,
    pub description: SourceMap,
    pub model: Option<PayloadSourceMap>,
    pub parameters: Vec<SourceMap>,
    pub headers: Vec<SourceMap>,
    pub actions: Vec<ActionSourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionSourceMap {
    pub name: SourceMap,
    pub method: SourceMap,
    pub description: SourceMap,
    pub parameters: Vec<SourceMap>,
    pub headers: Vec<SourceMap>,
    pub examples: Vec<TransactionExampleSourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionExampleSourceMap {
    pub name: SourceMap,
    pub description: SourceMap,
    pub requests: Vec<PayloadSourceMap>,
    pub responses: Vec<PayloadSourceMap>,
}

#[derive(Debug, Clone, Default)]
pub struct PayloadSourceMap {
    pub name: SourceMap,
    pub description: SourceMap,
    pub parameters: Vec<SourceMap>,
    pub headers: Vec<SourceMap>,
    pub body: SourceMap,
    pub schema: SourceMap,
}
