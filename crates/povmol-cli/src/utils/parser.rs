use nalgebra::Vector3;
use thiserror::Error;

/// Upper bound on the number of frames a selection may expand to.
const MAX_SELECTED_FRAMES: usize = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid frame number '{0}'. Expected a non-negative integer.")]
    InvalidFrame(String),

    #[error("Empty frame range '{0}'. The end must be larger than the start.")]
    EmptyRange(String),

    #[error("Frame selection '{0}' selects more than {MAX_SELECTED_FRAMES} frames.")]
    TooManyFrames(String),

    #[error("Invalid vector '{0}'. Expected three comma-separated numbers (e.g., '1,0,-2.5').")]
    InvalidVector(String),
}

fn parse_frame(s: &str) -> Result<usize, ParseError> {
    s.trim()
        .parse()
        .map_err(|_| ParseError::InvalidFrame(s.trim().to_string()))
}

/// Parses a frame selection.
///
/// Accepts a single frame (`"7"`), a half-open range (`"20..40"`), an
/// inclusive range (`"0..=10"`), or a comma-separated mix of those
/// (`"0,5,10..12"`). Frames are returned in the order written.
pub fn parse_frame_selection(s: &str) -> Result<Vec<usize>, ParseError> {
    let mut frames = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        let (start, end) = if let Some((a, b)) = part.split_once("..=") {
            let end = parse_frame(b)?;
            (parse_frame(a)?, end.saturating_add(1))
        } else if let Some((a, b)) = part.split_once("..") {
            (parse_frame(a)?, parse_frame(b)?)
        } else {
            let frame = parse_frame(part)?;
            let next = frame
                .checked_add(1)
                .ok_or_else(|| ParseError::InvalidFrame(part.to_string()))?;
            (frame, next)
        };
        if end <= start {
            return Err(ParseError::EmptyRange(part.to_string()));
        }
        if frames.len() + (end - start) > MAX_SELECTED_FRAMES {
            return Err(ParseError::TooManyFrames(s.to_string()));
        }
        frames.extend(start..end);
    }
    Ok(frames)
}

/// Parses `"x,y,z"` into a vector.
pub fn parse_vector3(s: &str) -> Result<Vector3<f64>, ParseError> {
    let invalid = || ParseError::InvalidVector(s.to_string());
    let components = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match components[..] {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(invalid()),
    }
}
