use serde::{Deserialize, Serialize};

use crate::engine::alignment::{AlignOp, Aligner};
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Correct,
    /// Typed char differs from the target char at this position.
    Incorrect,
    /// Typed char with no counterpart in the target.
    Extra,
    /// Target char skipped inside the typed region.
    Missing,
    /// Target text not reached yet.
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

/// Live highlight of an input against its reference text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub segments: Vec<Segment>,
    pub progress: f64,
    pub accuracy: f64,
    pub unfixed_errors: usize,
}

impl ComparisonResult {
    pub fn is_exact(&self) -> bool {
        self.unfixed_errors == 0 && self.segments.iter().all(|s| s.kind == SegmentKind::Correct)
    }
}

/// Build display segments for `input` typed against `target`.
///
/// Segment text for correct, incorrect and extra chars is the typed text;
/// missing and pending segments show the target text. Adjacent chars of the
/// same kind are merged into one segment.
pub fn compare(aligner: &Aligner, input: &str, target: &str) -> Result<ComparisonResult, EngineError> {
    let input: Vec<char> = input.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let (alignment, covered) = aligner.align_prefix(&input, &target)?;

    let mut segments: Vec<Segment> = Vec::new();
    let mut matches = 0;
    for op in alignment.operations() {
        let (ch, kind) = match *op {
            AlignOp::Match { input: i, .. } => {
                matches += 1;
                (input[i], SegmentKind::Correct)
            }
            AlignOp::Substitute { input: i, .. } => (input[i], SegmentKind::Incorrect),
            AlignOp::Insert { input: i } => (input[i], SegmentKind::Extra),
            AlignOp::Delete { target: j } => (target[j], SegmentKind::Missing),
        };
        push_char(&mut segments, ch, kind);
    }
    for &ch in &target[covered..] {
        push_char(&mut segments, ch, SegmentKind::Pending);
    }

    let progress = if target.is_empty() {
        0.0
    } else {
        input.len().min(target.len()) as f64 / target.len() as f64 * 100.0
    };
    let accuracy = if input.is_empty() {
        100.0
    } else {
        (matches as f64 / input.len() as f64 * 100.0).clamp(0.0, 100.0)
    };

    Ok(ComparisonResult {
        segments,
        progress,
        accuracy,
        unfixed_errors: alignment.unfixed_errors(),
    })
}

fn push_char(segments: &mut Vec<Segment>, ch: char, kind: SegmentKind) {
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push(ch),
        _ => segments.push(Segment {
            text: ch.to_string(),
            kind,
        }),
    }
}
