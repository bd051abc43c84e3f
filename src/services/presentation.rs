//! Display mapping for tasks: row and status colors, priority stars, the
//! status distribution and its pie chart, and the background themes.
//!
//! The mapping functions take raw labels rather than the enums so they can be
//! applied to any cell value; unknown labels map to no color. Star lookup is
//! the exception and rejects unknown priorities.

use std::f64::consts::PI;
use plotters::prelude::*;
use thiserror::Error;
use crate::models::{Task, TaskStatus};

#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    LightRed,
    LightYellow,
    LightGreen,
    Red,
    Orange,
    Green,
}

impl DisplayColor {
    pub fn css(&self) -> &'static str {
        match self {
            DisplayColor::LightRed => "#FFCCCC",
            DisplayColor::LightYellow => "#FFF2CC",
            DisplayColor::LightGreen => "#D9EAD3",
            DisplayColor::Red => "red",
            DisplayColor::Orange => "orange",
            DisplayColor::Green => "green",
        }
    }

    pub fn rgb(&self) -> RGBColor {
        match self {
            DisplayColor::LightRed => RGBColor(0xFF, 0xCC, 0xCC),
            DisplayColor::LightYellow => RGBColor(0xFF, 0xF2, 0xCC),
            DisplayColor::LightGreen => RGBColor(0xD9, 0xEA, 0xD3),
            DisplayColor::Red => RGBColor(0xFF, 0x00, 0x00),
            DisplayColor::Orange => RGBColor(0xFF, 0xA5, 0x00),
            DisplayColor::Green => RGBColor(0x00, 0x80, 0x00),
        }
    }
}

pub fn row_background(priority: &str) -> Option<DisplayColor> {
    match priority {
        "High" => Some(DisplayColor::LightRed),
        "Medium" => Some(DisplayColor::LightYellow),
        "Low" => Some(DisplayColor::LightGreen),
        _ => None,
    }
}

pub fn status_text_color(status: &str) -> Option<DisplayColor> {
    match status {
        "Pending" => Some(DisplayColor::Red),
        "In-Progress" => Some(DisplayColor::Orange),
        "Completed" => Some(DisplayColor::Green),
        _ => None,
    }
}

pub fn priority_stars(priority: &str) -> Result<usize, PresentationError> {
    match priority {
        "High" => Ok(3),
        "Medium" => Ok(2),
        "Low" => Ok(1),
        other => Err(PresentationError::UnknownPriority(other.to_string())),
    }
}

pub fn star_label(priority: &str) -> Result<String, PresentationError> {
    Ok("⭐".repeat(priority_stars(priority)?))
}

/// Counts tasks per status in workflow order, skipping empty statuses.
pub fn status_distribution(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| (status, tasks.iter().filter(|t| t.status == status).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

pub const THEMES: [(&str, &str); 4] = [
    ("Nature", "https://images.unsplash.com/photo-1506748686214-e9df14d4d9d0"),
    ("Sky", "https://images.unsplash.com/photo-1506744038136-46273834b3fb"),
    ("Dark Abstract", "https://images.unsplash.com/photo-1581349482625-368a64dc9f4b"),
    ("Office", "https://images.unsplash.com/photo-1587614203976-365c74645e83"),
];

pub const DEFAULT_THEME: &str = "Nature";

pub fn theme_url(name: &str) -> Option<&'static str> {
    THEMES.iter().find(|(n, _)| *n == name).map(|(_, url)| *url)
}

const CHART_SIZE: (u32, u32) = (640, 420);
const CHART_TITLE: &str = "Task Status Distribution";

/// Renders the distribution as an SVG pie chart with a legend.
pub fn render_status_chart(distribution: &[(TaskStatus, usize)]) -> Result<String, PresentationError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        root.draw(&Text::new(CHART_TITLE, (20, 20), ("sans-serif", 22).into_font()))
            .map_err(chart_error)?;

        let total: usize = distribution.iter().map(|(_, count)| count).sum();
        if total == 0 {
            root.draw(&Text::new("No tasks yet", (260, 200), ("sans-serif", 18).into_font()))
                .map_err(chart_error)?;
        }

        let center = (220.0, 230.0);
        let radius = 150.0;
        let mut start = -PI / 2.0;
        for (idx, (status, count)) in distribution.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let sweep = 2.0 * PI * (*count as f64) / (total as f64);
            let color = status_text_color(status.as_str())
                .map(|c| c.rgb())
                .unwrap_or(BLACK);
            root.draw(&Polygon::new(slice_points(center, radius, start, sweep), color.filled()))
                .map_err(chart_error)?;
            start += sweep;

            // Legend entry
            let y = 80 + 30 * idx as i32;
            root.draw(&Rectangle::new([(430, y), (448, y + 18)], color.filled()))
                .map_err(chart_error)?;
            let percent = 100.0 * (*count as f64) / (total as f64);
            let label = format!("{} {} ({:.1}%)", status, count, percent);
            root.draw(&Text::new(label, (456, y + 2), ("sans-serif", 16).into_font()))
                .map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

// Approximates the arc with one vertex per degree.
fn slice_points(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.to_degrees().ceil()) as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=steps {
        let angle = start + sweep * (step as f64) / (steps as f64);
        points.push((
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        ));
    }
    points
}

fn chart_error<E: std::fmt::Display>(err: E) -> PresentationError {
    PresentationError::Chart(err.to_string())
}
