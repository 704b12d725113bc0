use std::path::PathBuf;

use crate::survey::PatternSurvey;

/// Widest plot area a snapshot will render, in pixels.
const MAX_PLOT_WIDTH: u64 = 4000;

/// Pixels reserved right of the plot area.
const RIGHT_MARGIN: u32 = 8;

/// Height in pixels of the x-axis area below the rows.
const AXIS_HEIGHT: u32 = 12;

/// Configuration for scatter snapshot export.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Output directory for generated snapshot files.
    pub output_dir: PathBuf,
    /// Horizontal pixels allotted per integer (shrunk to fit wide ranges).
    pub x_scale: u32,
    /// Vertical pixels per pattern row.
    pub row_height: u32,
    /// Point marker half-size in pixels.
    pub point_size: u32,
    /// Width in pixels of the row-label gutter on the left.
    pub gutter: u32,
    /// Height in pixels of the header line at the top.
    pub header_height: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("snapshots"),
            x_scale: 4,
            row_height: 20,
            point_size: 1,
            gutter: 48,
            header_height: 14,
        }
    }
}

/// Result of a snapshot export.
#[derive(Debug, Clone)]
pub struct SnapshotResult {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Export the survey's scatter to a single-frame GIF.
///
/// The image mirrors the interactive plot: one horizontal row per pattern,
/// color-coded points at each start value, row labels in the left gutter,
/// and a header line with the survey parameters.
pub fn export_snapshot(
    survey: &PatternSurvey,
    config: &SnapshotConfig,
) -> Result<SnapshotResult, String> {
    let limit = survey.params.limit;
    if limit == 0 {
        return Err("survey range is empty".into());
    }
    if limit > MAX_PLOT_WIDTH {
        return Err(format!("range 1..={limit} is too wide for a snapshot"));
    }
    let x_scale = config
        .x_scale
        .max(1)
        .min((MAX_PLOT_WIDTH / limit) as u32)
        .max(1);

    let n_rows = survey.rows.len().max(1) as u32;
    let row_height = config.row_height.max(4);
    let width = config.gutter + limit as u32 * x_scale + RIGHT_MARGIN;
    let height = config.header_height + n_rows * row_height + AXIS_HEIGHT;
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(format!("snapshot dimensions {width}x{height} exceed the GIF limit"));
    }

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| format!("Failed to create output dir: {e}"))?;
    let path = config.output_dir.join(format!(
        "hancock_b{}_n{}.gif",
        survey.params.base, limit
    ));

    let mut pixels = vec![0u8; (width * height * 4) as usize];

    // Background.
    fill_rect(&mut pixels, width, 0, 0, width, height, [0x0e, 0x0e, 0x16]);

    // Header line.
    let header = format!(
        "base {}  n=1..{}  patterns: {}",
        survey.params.base,
        limit,
        survey.distinct_patterns(),
    );
    render_text(&mut pixels, width, 2, 3, &header, [0xcc, 0xcc, 0xcc]);

    // Rows: guide line and label per pattern, unresolved included.
    for (row, label) in survey.rows.iter().enumerate() {
        let cy = config.header_height + row as u32 * row_height + row_height / 2;
        fill_rect(
            &mut pixels,
            width,
            config.gutter,
            cy,
            limit as u32 * x_scale,
            1,
            [0x22, 0x22, 0x2e],
        );
        let color = survey.color_of(label);
        render_text(&mut pixels, width, 2, cy.saturating_sub(3), label, color);
    }

    // Points.
    let ps = config.point_size;
    for (i, label) in survey.assignments.iter().enumerate() {
        let Some(row) = survey.row_of(label) else {
            continue;
        };
        let cx = config.gutter + i as u32 * x_scale + x_scale / 2;
        let cy = config.header_height + row as u32 * row_height + row_height / 2;
        let color = survey.color_of(label);
        fill_rect(
            &mut pixels,
            width,
            cx.saturating_sub(ps),
            cy.saturating_sub(ps),
            2 * ps + 1,
            2 * ps + 1,
            color,
        );
    }

    // X-axis endpoints.
    let axis_y = config.header_height + n_rows * row_height + 2;
    render_text(&mut pixels, width, config.gutter, axis_y, "1", [0x88, 0x88, 0x88]);
    let end_label = limit.to_string();
    let end_x = (width - RIGHT_MARGIN).saturating_sub(end_label.len() as u32 * 6);
    render_text(&mut pixels, width, end_x, axis_y, &end_label, [0x88, 0x88, 0x88]);

    // Single-frame GIF.
    let file = std::fs::File::create(&path).map_err(|e| format!("Failed to create file: {e}"))?;
    let mut encoder = gif::Encoder::new(file, width as u16, height as u16, &[])
        .map_err(|e| format!("Failed to create GIF encoder: {e}"))?;
    let frame = gif::Frame::from_rgba_speed(width as u16, height as u16, &mut pixels, 1);
    encoder
        .write_frame(&frame)
        .map_err(|e| format!("Failed to write frame: {e}"))?;

    Ok(SnapshotResult {
        path,
        width,
        height,
    })
}

/// Fill an axis-aligned rectangle in the RGBA buffer (with clipping).
fn fill_rect(pixels: &mut [u8], img_width: u32, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
    let img_height = pixels.len() as u32 / (img_width * 4);
    for py in y..y.saturating_add(h) {
        if py >= img_height {
            break;
        }
        for px in x..x.saturating_add(w) {
            if px >= img_width {
                break;
            }
            let idx = ((py * img_width + px) * 4) as usize;
            pixels[idx] = rgb[0];
            pixels[idx + 1] = rgb[1];
            pixels[idx + 2] = rgb[2];
            pixels[idx + 3] = 0xff;
        }
    }
}

// ── Minimal 5×7 bitmap font ─────────────────────────────────────────────────

/// Render a string using the built-in 5×7 bitmap font.
fn render_text(pixels: &mut [u8], img_width: u32, start_x: u32, start_y: u32, text: &str, rgb: [u8; 3]) {
    let img_height = pixels.len() as u32 / (img_width * 4);
    let mut cursor_x = start_x;
    for ch in text.chars() {
        let glyph = char_glyph(ch);
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..5u32 {
                if (bits >> (4 - col)) & 1 == 1 {
                    let px = cursor_x + col;
                    let py = start_y + row as u32;
                    if px < img_width && py < img_height {
                        let idx = ((py * img_width + px) * 4) as usize;
                        pixels[idx] = rgb[0];
                        pixels[idx + 1] = rgb[1];
                        pixels[idx + 2] = rgb[2];
                        pixels[idx + 3] = 0xff;
                    }
                }
            }
        }
        cursor_x += 6; // 5 pixels wide + 1 pixel gap
    }
}

/// 5×7 bitmap for a character; one byte per row, top 5 bits are the columns
/// (MSB leftmost). Letters share one glyph per pair of cases.
fn char_glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_lowercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        'a' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'b' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'c' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'e' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'f' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'g' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'h' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'i' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'l' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'm' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'n' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'o' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'r' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        's' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        't' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'u' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'v' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'w' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'x' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b01000],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111], // box
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{run_survey, SurveyParams};

    fn test_config(dir: PathBuf) -> SnapshotConfig {
        SnapshotConfig {
            output_dir: dir,
            ..SnapshotConfig::default()
        }
    }

    #[test]
    fn snapshot_creates_a_gif() {
        let dir = std::env::temp_dir().join("hancock_test_snapshot");
        let _ = std::fs::remove_dir_all(&dir);

        let survey = run_survey(SurveyParams::new(10, 64));
        let result = export_snapshot(&survey, &test_config(dir.clone())).unwrap();
        assert!(result.path.exists());
        assert!(result.width > 0 && result.height > 0);
        let bytes = std::fs::read(&result.path).unwrap();
        assert!(bytes.starts_with(b"GIF"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn snapshot_filename_carries_the_parameters() {
        let dir = std::env::temp_dir().join("hancock_test_snapshot_name");
        let _ = std::fs::remove_dir_all(&dir);

        let survey = run_survey(SurveyParams::new(16, 32));
        let result = export_snapshot(&survey, &test_config(dir.clone())).unwrap();
        assert_eq!(
            result.path.file_name().and_then(|n| n.to_str()),
            Some("hancock_b16_n32.gif"),
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversized_range_is_rejected() {
        let dir = std::env::temp_dir().join("hancock_test_snapshot_wide");
        let survey = run_survey(SurveyParams {
            base: 10,
            limit: MAX_PLOT_WIDTH + 1,
            max_iter: 1,
        });
        let err = export_snapshot(&survey, &test_config(dir)).unwrap_err();
        assert!(err.contains("too wide"), "unexpected error: {err}");
    }

    #[test]
    fn unresolved_only_survey_still_exports() {
        let dir = std::env::temp_dir().join("hancock_test_snapshot_other");
        let _ = std::fs::remove_dir_all(&dir);

        let survey = run_survey(SurveyParams {
            base: 10,
            limit: 16,
            max_iter: 1,
        });
        assert_eq!(survey.distinct_patterns(), 0);
        let result = export_snapshot(&survey, &test_config(dir.clone())).unwrap();
        assert!(result.path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn render_text_clips_at_the_border() {
        let width = 20u32;
        let height = 10u32;
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        render_text(&mut pixels, width, 15, 6, "abc", [0xff, 0xff, 0xff]);
        // Out-of-bounds columns and rows are dropped, not wrapped.
        assert_eq!(pixels.len(), (width * height * 4) as usize);
    }

    #[test]
    fn fill_rect_clips_at_the_border() {
        let width = 8u32;
        let height = 8u32;
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        fill_rect(&mut pixels, width, 6, 6, 10, 10, [0x11, 0x22, 0x33]);
        let idx = ((7 * width + 7) * 4) as usize;
        assert_eq!(&pixels[idx..idx + 3], &[0x11, 0x22, 0x33]);
    }
}
