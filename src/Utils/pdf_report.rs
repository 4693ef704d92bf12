use crate::polar::errors::{Field, PolarError, Result};
use crate::polar::expression_builder::IntegralForm;
use crate::polar::pipeline::ComputeReport;
use log::info;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const FONT_SIZE: f32 = 11.0;
const MAX_LINE_CHARS: usize = 90;

/// Plain text summary of one compute action, ready to be laid out on A4 pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfReport {
    pub title: String,
    pub lines: Vec<String>,
}

// the builtin fonts only cover ASCII
fn ascii(text: &str) -> String {
    text.chars().map(|c| if c.is_ascii() { c } else { '?' }).collect()
}

fn wrap(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(MAX_LINE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

impl PdfReport {
    pub fn from_report(form: &IntegralForm, report: &ComputeReport) -> Self {
        let mut lines = vec![
            format!("Integrand: f(x, y) = {}", form.field(Field::Integrand)),
            format!(
                "Limits: x from {} to {}, y from {} to {}",
                form.field(Field::XLower),
                form.field(Field::XUpper),
                form.field(Field::YLower),
                form.field(Field::YUpper)
            ),
            String::new(),
        ];
        for step in &report.steps {
            lines.push(format!("{}: {}", step.title, step.text));
        }
        lines.push(String::new());
        lines.push(format!("Result: {}", report.result_text()));
        lines.push(format!("Evaluated by: {}", report.tier));
        for warning in &report.warnings {
            lines.push(format!("Warning: {}", warning));
        }
        Self {
            title: "Polar double integral".to_string(),
            lines: lines.iter().map(|l| ascii(l)).collect(),
        }
    }

    /// Renders the report into PDF bytes in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let export = |e: printpdf::Error| PolarError::Export(format!("pdf: {}", e));
        let (doc, page, layer) = PdfDocument::new(
            self.title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export)?;

        let mut layer_ref = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;
        layer_ref.use_text(
            self.title.as_str(),
            FONT_SIZE + 5.0,
            Mm(MARGIN),
            Mm(y),
            &bold,
        );
        y -= 2.0 * LINE_HEIGHT;
        for line in self.lines.iter().flat_map(|l| wrap(l)) {
            if y < MARGIN {
                let (page, layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                layer_ref = doc.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            layer_ref.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
            y -= LINE_HEIGHT;
        }
        doc.save_to_bytes().map_err(export)
    }

    /// Saves the report into `dir` under a name no other request uses
    /// (`integral_result_<random>.pdf`) and returns the path with the file content.
    pub fn save_unique(&self, dir: &Path) -> Result<(PathBuf, Vec<u8>)> {
        let bytes = self.to_bytes()?;
        fs::create_dir_all(dir)?;
        let mut file = Builder::new()
            .prefix("integral_result_")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        let (_, path) = file
            .keep()
            .map_err(|e| PolarError::Export(format!("could not keep {}: {}", e.file.path().display(), e.error)))?;
        let content = fs::read(&path)?;
        info!("report saved to {}", path.display());
        Ok((path, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::pipeline::{ComputeOptions, compute};
    use tempfile::tempdir;

    fn circle_report() -> (IntegralForm, PdfReport) {
        let form = IntegralForm::circle_example();
        let report = compute(&form, &ComputeOptions::default()).unwrap();
        let pdf = PdfReport::from_report(&form, &report);
        (form, pdf)
    }

    #[test]
    fn test_report_lines() {
        let (_, pdf) = circle_report();
        assert!(pdf.lines.contains(&"Result: 25.1327".to_string()));
        assert!(pdf.lines.iter().all(|l| l.is_ascii()));
        assert_eq!(pdf.lines[0], "Integrand: f(x, y) = x**2 + y**2");
    }

    #[test]
    fn test_pdf_bytes() {
        let (_, pdf) = circle_report();
        let bytes = pdf.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_report_spans_pages() {
        let pdf = PdfReport {
            title: "long".to_string(),
            lines: (0..100).map(|i| format!("line {}", i)).collect(),
        };
        assert!(pdf.to_bytes().unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_save_unique() {
        let (_, pdf) = circle_report();
        let dir = tempdir().unwrap();
        let (first, content) = pdf.save_unique(dir.path()).unwrap();
        let (second, _) = pdf.save_unique(dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("integral_result_") && name.ends_with(".pdf"));
        assert!(content.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_and_ascii() {
        assert_eq!(wrap(&"a".repeat(95)).len(), 2);
        assert_eq!(wrap(""), vec![String::new()]);
        assert_eq!(ascii("θ = 2π"), "? = 2?");
    }
}
