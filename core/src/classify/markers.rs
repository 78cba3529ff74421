use crate::model::Phase;

/// How a marker is matched against a line.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Match {
    Contains(&'static str),
    ContainsIgnoreCase(&'static str),
}

/// What the status text becomes when a marker fires.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Label {
    /// The trimmed line itself.
    Line,
    /// Only the token after the marker word (`Compiling Foo x.swift` gives `Foo`).
    NextToken(&'static str),
}

pub(crate) struct Marker {
    pub matcher: Match,
    pub phase: Phase,
    pub label: Label,
}

/// Ordered; the first matching row wins.
pub(crate) const MARKERS: &[Marker] = &[
    Marker {
        matcher: Match::Contains("Fetching "),
        phase: Phase::Fetching,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Cloning "),
        phase: Phase::Fetching,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Updating "),
        phase: Phase::Updating,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Resolving"),
        phase: Phase::Resolving,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Computing version"),
        phase: Phase::Resolving,
        label: Label::Line,
    },
    Marker {
        matcher: Match::ContainsIgnoreCase("building for"),
        phase: Phase::Preparing,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Planning build"),
        phase: Phase::Preparing,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Compiling"),
        phase: Phase::Compiling,
        label: Label::NextToken("Compiling"),
    },
    Marker {
        matcher: Match::Contains("Emitting module"),
        phase: Phase::Compiling,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Linking"),
        phase: Phase::Linking,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Test Suite"),
        phase: Phase::Testing,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Testing"),
        phase: Phase::Testing,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Build complete!"),
        phase: Phase::Completed,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Build succeeded"),
        phase: Phase::Completed,
        label: Label::Line,
    },
    Marker {
        matcher: Match::Contains("Executing"),
        phase: Phase::Running,
        label: Label::Line,
    },
];

impl Match {
    pub(crate) fn is_match(&self, line: &str, lower: &str) -> bool {
        match self {
            Match::Contains(s) => line.contains(s),
            Match::ContainsIgnoreCase(s) => lower.contains(s),
        }
    }
}

impl Label {
    pub(crate) fn render(&self, line: &str) -> String {
        match self {
            Label::Line => line.to_string(),
            Label::NextToken(word) => line
                .find(word)
                .and_then(|idx| line[idx + word.len()..].split_whitespace().next())
                .unwrap_or(line)
                .to_string(),
        }
    }
}
