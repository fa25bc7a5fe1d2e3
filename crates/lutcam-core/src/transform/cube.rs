//! Adobe `.cube` 3D LUT reading and writing.
//!
//! Supported keywords: `TITLE`, `LUT_3D_SIZE`, `DOMAIN_MIN`, `DOMAIN_MAX`.
//! Data rows list red fastest, then green, then blue, which is exactly the
//! `[blue][green][red]` storage order of [`Lut3D`]. Only the unit input
//! domain is accepted because sampling assumes `[0, 1]` inputs.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::GradeError;
use crate::transform::lut::Lut3D;

impl Lut3D {
    /// Parse `.cube` text.
    pub fn parse_cube(text: &str) -> Result<Self, GradeError> {
        let mut size = None;
        let mut title = None;
        let mut data = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };

            match keyword {
                "TITLE" => {
                    let rest = line["TITLE".len()..].trim().trim_matches('"');
                    title = Some(rest.to_string());
                }
                "LUT_3D_SIZE" => {
                    let value = tokens
                        .next()
                        .ok_or_else(|| GradeError::cube_parse(line_no, "LUT_3D_SIZE has no value"))?;
                    let parsed: usize = value.parse().map_err(|_| {
                        GradeError::cube_parse(line_no, format!("invalid LUT_3D_SIZE `{value}`"))
                    })?;
                    size = Some(parsed);
                }
                "LUT_1D_SIZE" => {
                    return Err(GradeError::cube_parse(line_no, "1D LUTs are not supported"));
                }
                "DOMAIN_MIN" => {
                    let domain = parse_triplet(tokens, line_no)?;
                    if domain != [0.0; 3] {
                        return Err(GradeError::cube_parse(
                            line_no,
                            format!("unsupported DOMAIN_MIN {domain:?}"),
                        ));
                    }
                }
                "DOMAIN_MAX" => {
                    let domain = parse_triplet(tokens, line_no)?;
                    if domain != [1.0; 3] {
                        return Err(GradeError::cube_parse(
                            line_no,
                            format!("unsupported DOMAIN_MAX {domain:?}"),
                        ));
                    }
                }
                _ if starts_numeric(keyword) => {
                    data.push(parse_triplet(line.split_whitespace(), line_no)?);
                }
                other => {
                    tracing::debug!("skipping unknown .cube keyword `{other}` on line {line_no}");
                }
            }
        }

        let size = size.ok_or_else(|| GradeError::InvalidLut("missing LUT_3D_SIZE".into()))?;
        let lut = Lut3D::new(size, data)?;
        Ok(match title {
            Some(title) => lut.with_title(title),
            None => lut,
        })
    }

    /// Load a 3D LUT from a `.cube` file.
    pub fn load_cube(path: &Path) -> Result<Self, GradeError> {
        let text = fs::read_to_string(path)?;
        Self::parse_cube(&text)
    }

    /// Serialize this LUT as `.cube` text.
    pub fn to_cube_string(&self) -> String {
        let mut out = String::with_capacity(self.cells().len() * 28 + 128);
        // Writing into a String cannot fail.
        if let Some(title) = self.title() {
            let _ = writeln!(out, "TITLE \"{title}\"");
        }
        let _ = writeln!(out, "LUT_3D_SIZE {}", self.size());
        let _ = writeln!(out, "DOMAIN_MIN 0.0 0.0 0.0");
        let _ = writeln!(out, "DOMAIN_MAX 1.0 1.0 1.0");
        for [r, g, b] in self.cells() {
            let _ = writeln!(out, "{r:.6} {g:.6} {b:.6}");
        }
        out
    }

    /// Save this 3D LUT to a `.cube` file.
    pub fn save_cube(&self, path: &Path) -> Result<(), GradeError> {
        fs::write(path, self.to_cube_string())?;
        Ok(())
    }
}

fn starts_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

fn parse_triplet<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; 3], GradeError> {
    let mut out = [0.0_f32; 3];
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| GradeError::cube_parse(line_no, "expected three values"))?;
        *slot = token
            .parse()
            .map_err(|_| GradeError::cube_parse(line_no, format!("invalid number `{token}`")))?;
    }
    if tokens.next().is_some() {
        return Err(GradeError::cube_parse(line_no, "expected exactly three values"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CUBE: &str = "\
# created by hand
TITLE \"Invert\"
LUT_3D_SIZE 2
DOMAIN_MIN 0.0 0.0 0.0
DOMAIN_MAX 1.0 1.0 1.0

1.0 1.0 1.0
0.0 1.0 1.0
1.0 0.0 1.0
0.0 0.0 1.0
1.0 1.0 0.0
0.0 1.0 0.0
1.0 0.0 0.0
0.0 0.0 0.0
";

    #[test]
    fn test_parse_cube_reads_header_and_rows() {
        let lut = Lut3D::parse_cube(TWO_CUBE).unwrap();
        assert_eq!(lut.size(), 2);
        assert_eq!(lut.title(), Some("Invert"));
        // Second row is red=1, green=0, blue=0.
        assert_eq!(lut.get(0, 0, 1), Some([0.0, 1.0, 1.0]));
        assert_eq!(lut.sample([1.0, 0.0, 0.0]), [0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_parse_cube_rejects_short_table() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n1 1 1\n";
        assert!(matches!(
            Lut3D::parse_cube(text),
            Err(GradeError::InvalidLut(_))
        ));
    }

    #[test]
    fn test_parse_cube_reports_line_of_bad_row() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n0.5 nope 0\n";
        match Lut3D::parse_cube(text) {
            Err(GradeError::CubeParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected CubeParse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_cube_rejects_non_unit_domain() {
        let text = "LUT_3D_SIZE 2\nDOMAIN_MAX 2.0 2.0 2.0\n";
        assert!(matches!(
            Lut3D::parse_cube(text),
            Err(GradeError::CubeParse { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_cube_requires_size() {
        assert!(Lut3D::parse_cube("0 0 0\n").is_err());
    }

    #[test]
    fn test_cube_text_survives_write_and_read() {
        let lut = Lut3D::from_fn(3, |[r, g, b]| [g, b * 0.5, r])
            .unwrap()
            .with_title("Swizzle");
        let back = Lut3D::parse_cube(&lut.to_cube_string()).unwrap();
        assert_eq!(back.size(), 3);
        assert_eq!(back.title(), Some("Swizzle"));
        for (a, b) in lut.cells().iter().zip(back.cells()) {
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() < 1e-6);
            }
        }
    }
}
