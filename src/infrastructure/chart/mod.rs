// ============================================================
// HEATMAP RENDERER
// ============================================================
// Correlation matrix -> annotated PNG via plotters + image

use std::io::Cursor;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use walkdir::WalkDir;

use crate::domain::error::{AppError, Result};
use crate::domain::stats::CorrelationMatrix;

const MARGIN_LEFT: u32 = 150;
const MARGIN_TOP: u32 = 30;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_BOTTOM: u32 = 90;
const MAX_LABEL_CHARS: usize = 14;

/// Renders a correlation matrix as a square annotated heatmap.
///
/// Cell color runs through a diverging blue/white/red scale centered at
/// zero; each finite coefficient is printed into its cell; axis labels are
/// the column names. A 1x1 matrix still renders (a near-empty image) so
/// single-numeric-column tables get a chart too.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatmapRenderer;

impl HeatmapRenderer {
    /// Render to PNG bytes. Fails with `RenderError` when no usable font
    /// is installed or the backend rejects the drawing; callers treat that
    /// as a recoverable, chart-less outcome.
    pub fn render(&self, matrix: &CorrelationMatrix) -> Result<Vec<u8>> {
        if matrix.is_empty() {
            return Err(AppError::RenderError(
                "correlation matrix is empty".to_string(),
            ));
        }
        ensure_font()?;

        let n = matrix.len() as u32;
        let cell = (560 / n).clamp(36, 96);
        let width = MARGIN_LEFT + cell * n + MARGIN_RIGHT;
        let height = MARGIN_TOP + cell * n + MARGIN_BOTTOM;

        let mut pixels = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            draw_cells(&root, matrix, cell)?;
            draw_labels(&root, matrix, cell)?;
            root.present().map_err(render_err)?;
        }

        encode_png(width, height, pixels)
    }
}

fn draw_cells(
    root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    matrix: &CorrelationMatrix,
    cell: u32,
) -> Result<()> {
    let n = matrix.len();
    let value_size = (cell as f64 * 0.30).clamp(11.0, 17.0) as i32;

    for row in 0..n {
        for col in 0..n {
            let r = matrix.get(row, col);
            let x0 = (MARGIN_LEFT + col as u32 * cell) as i32;
            let y0 = (MARGIN_TOP + row as u32 * cell) as i32;
            let x1 = x0 + cell as i32;
            let y1 = y0 + cell as i32;

            root.draw(&Rectangle::new([(x0, y0), (x1, y1)], diverging_color(r).filled()))
                .map_err(render_err)?;

            if r.is_finite() {
                let ink = if r.abs() > 0.6 { &WHITE } else { &BLACK };
                let style = ("sans-serif", value_size)
                    .into_font()
                    .color(ink)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new(
                    format!("{:.2}", r),
                    (x0 + cell as i32 / 2, y0 + cell as i32 / 2),
                    style,
                ))
                .map_err(render_err)?;
            }
        }
    }
    Ok(())
}

fn draw_labels(
    root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    matrix: &CorrelationMatrix,
    cell: u32,
) -> Result<()> {
    let n = matrix.len();
    let bottom = (MARGIN_TOP + n as u32 * cell) as i32;

    for (idx, name) in matrix.labels().iter().enumerate() {
        let label = truncate_label(name);
        let center = (idx as u32 * cell + cell / 2) as i32;

        let x_style = ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            label.clone(),
            (MARGIN_LEFT as i32 + center, bottom + 8),
            x_style,
        ))
        .map_err(render_err)?;

        let y_style = ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        root.draw(&Text::new(
            label,
            (MARGIN_LEFT as i32 - 8, MARGIN_TOP as i32 + center),
            y_style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

/// Diverging colormap centered at zero: strong negative correlations are
/// blue, strong positive ones red, zero near-white. NaN cells are gray.
fn diverging_color(r: f64) -> RGBColor {
    const LOW: (u8, u8, u8) = (59, 76, 192);
    const MID: (u8, u8, u8) = (221, 221, 221);
    const HIGH: (u8, u8, u8) = (180, 4, 38);

    if !r.is_finite() {
        return RGBColor(235, 235, 235);
    }

    let t = ((r + 1.0) / 2.0).clamp(0.0, 1.0);
    let (from, to, frac) = if t < 0.5 {
        (LOW, MID, t * 2.0)
    } else {
        (MID, HIGH, (t - 0.5) * 2.0)
    };

    RGBColor(
        lerp(from.0, to.0, frac),
        lerp(from.1, to.1, frac),
        lerp(from.2, to.2, frac),
    )
}

fn lerp(from: u8, to: u8, frac: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * frac).round() as u8
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
    short.push('…');
    short
}

fn encode_png(width: u32, height: u32, pixels: Vec<u8>) -> Result<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| AppError::RenderError("pixel buffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(render_err)?;
    Ok(png)
}

fn render_err<E: std::fmt::Display>(err: E) -> AppError {
    AppError::RenderError(err.to_string())
}

// Font registration happens once per process. The backend has no system
// font discovery of its own, so a TrueType file is located on disk and
// registered under the "sans-serif" family the text styles above use.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| match load_font_bytes() {
        Some(bytes) => plotters::style::register_font(
            "sans-serif",
            FontStyle::Normal,
            Box::leak(bytes.into_boxed_slice()),
        )
        .is_ok(),
        None => false,
    });

    if ok {
        Ok(())
    } else {
        Err(AppError::RenderError(
            "no usable TrueType font found on this system".to_string(),
        ))
    }
}

fn load_font_bytes() -> Option<Vec<u8>> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    for path in CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            return Some(bytes);
        }
    }

    // Fall back to the first .ttf anywhere under the usual font roots.
    for dir in ["/usr/share/fonts", "/usr/local/share/fonts"] {
        for entry in WalkDir::new(dir).max_depth(5).into_iter().flatten() {
            let path = entry.path();
            if path.extension().map(|e| e.eq_ignore_ascii_case("ttf")) == Some(true) {
                if let Ok(bytes) = std::fs::read(path) {
                    return Some(bytes);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::CorrelationMatrix;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    fn two_by_two() -> CorrelationMatrix {
        CorrelationMatrix::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, -0.5], vec![-0.5, 1.0]],
        )
    }

    #[test]
    fn test_diverging_color_endpoints() {
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(0.0), RGBColor(221, 221, 221));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(f64::NAN), RGBColor(235, 235, 235));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short"), "short");
        let long = truncate_label("a_very_long_column_name_indeed");
        assert_eq!(long.chars().count(), MAX_LABEL_CHARS);
        assert!(long.ends_with('…'));
    }

    #[test]
    fn test_render_produces_png() {
        // Hosts without any TrueType font report RenderError instead;
        // that path is exercised by the graceful-degradation tests.
        match HeatmapRenderer.render(&two_by_two()) {
            Ok(png) => {
                assert_eq!(&png[..8], &PNG_MAGIC);
                let decoded = image::load_from_memory(&png).unwrap();
                assert!(decoded.width() > MARGIN_LEFT);
            }
            Err(AppError::RenderError(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_render_single_cell_matrix() {
        let m = CorrelationMatrix::new(vec!["only".to_string()], vec![vec![1.0]]);
        match HeatmapRenderer.render(&m) {
            Ok(png) => assert_eq!(&png[..8], &PNG_MAGIC),
            Err(AppError::RenderError(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_matrix_is_a_render_error() {
        assert!(matches!(
            HeatmapRenderer.render(&CorrelationMatrix::empty()),
            Err(AppError::RenderError(_))
        ));
    }
}
