use crate::{
    clock::face::{ClockFace, ClockTime},
    foundation::core::{Line, Point, Vec2},
    foundation::error::{LapseError, LapseResult},
};

/// Largest accepted image side, in pixels.
pub const MAX_CLOCK_SIZE: u32 = 16_384;

// Dial geometry on a 200-unit reference square.
const REFERENCE_SIZE: f64 = 200.0;
const CENTRE: f64 = 100.0;
const MAJOR_TICK: (f64, f64, f64) = (60.0, 94.0, 10.0);
const MINOR_TICK: (f64, f64, f64) = (70.0, 94.0, 7.0);
const HOUR_HAND: (f64, f64) = (60.0, 9.0);
const MINUTE_HAND: (f64, f64) = (85.0, 6.0);

/// A line segment drawn with a round-capped stroke.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Stroke {
    pub line: Line,
    pub width: f64,
}

/// Backend-agnostic clock drawing in pixel coordinates (y grows downwards).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClockScene {
    /// Side of the square canvas in pixels.
    pub size: u32,
    pub ticks: Vec<Stroke>,
    pub hour_hand: Stroke,
    pub minute_hand: Stroke,
}

impl ClockScene {
    /// Every stroke in paint order: ticks, hour hand, minute hand.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.ticks
            .iter()
            .chain([&self.hour_hand, &self.minute_hand])
    }
}

fn radial(centre: Point, angle_deg: f64, radius: f64) -> Point {
    let a = angle_deg.to_radians();
    centre + Vec2::new(a.cos() * radius, -a.sin() * radius)
}

pub fn validate_size(size: u32) -> LapseResult<()> {
    if size == 0 || size > MAX_CLOCK_SIZE {
        return Err(LapseError::validation(format!(
            "clock size must be in 1..={MAX_CLOCK_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// Lay out `face` on a `size`×`size` canvas.
pub fn layout(face: &ClockFace, size: u32) -> LapseResult<ClockScene> {
    validate_size(size)?;
    let factor = f64::from(size) / REFERENCE_SIZE;
    let centre = Point::new(CENTRE * factor, CENTRE * factor);

    let ticks = face
        .ticks
        .iter()
        .map(|t| {
            let (inner, outer, width) = if t.major { MAJOR_TICK } else { MINOR_TICK };
            Stroke {
                line: Line::new(
                    radial(centre, t.angle_deg, inner * factor),
                    radial(centre, t.angle_deg, outer * factor),
                ),
                width: width * factor,
            }
        })
        .collect();

    let hand = |angle_deg: f64, (length, width): (f64, f64)| Stroke {
        line: Line::new(centre, radial(centre, angle_deg, length * factor)),
        width: width * factor,
    };

    Ok(ClockScene {
        size,
        ticks,
        hour_hand: hand(face.hour_angle_deg, HOUR_HAND),
        minute_hand: hand(face.minute_angle_deg, MINUTE_HAND),
    })
}

/// Clock drawing for `time` on a `size`×`size` canvas.
pub fn render(time: ClockTime, size: u32) -> LapseResult<ClockScene> {
    layout(&ClockFace::at(time), size)
}

#[cfg(test)]
#[path = "../../tests/unit/clock/scene.rs"]
mod tests;
