//! Validated point sets built from raw user input
//!
//! Raw rows come from JSON arrays (numbers and strings mixed) or from
//! form/CLI text such as `"0,0,A;0,1,A;5,5,B"`. A [`PointSet`] is immutable
//! once built; every request builds its own.

use crate::error::{PredictError, PredictResult};
use crate::models::{Label, Point};
use serde::{Deserialize, Serialize};

/// One raw cell of an input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    fn to_number(&self) -> Option<f64> {
        match self {
            RawField::Number(value) => Some(*value),
            RawField::Text(text) => text.trim().parse::<f64>().ok(),
        }
        .filter(|value| value.is_finite())
    }

    fn to_text(&self) -> String {
        match self {
            RawField::Number(value) => value.to_string(),
            RawField::Text(text) => text.trim().to_string(),
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(text: &str) -> Self {
        RawField::Text(text.to_string())
    }
}

impl std::fmt::Display for RawField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// How the trailing cell of each raw row is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Every cell is a coordinate
    Unlabeled,
    /// Trailing cell is a category name
    Category,
    /// Trailing cell is a numeric regression target
    Target,
}

/// Ordered, immutable collection of points sharing one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
    dimension: usize,
}

impl PointSet {
    /// Parse raw rows into a validated point set
    pub fn build(rows: &[Vec<RawField>], labels: LabelKind) -> PredictResult<Self> {
        let first = rows
            .first()
            .ok_or_else(|| PredictError::validation("no sample points supplied"))?;
        let arity = first.len();
        let label_cells = usize::from(labels != LabelKind::Unlabeled);

        if arity <= label_cells {
            return Err(PredictError::validation(format!(
                "row 1 has {} field(s); at least {} required",
                arity,
                label_cells + 1
            )));
        }

        let dimension = arity - label_cells;
        let mut points = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            if row.len() != arity {
                return Err(PredictError::validation(format!(
                    "row {} has {} field(s) but row 1 has {}",
                    row_number,
                    row.len(),
                    arity
                )));
            }

            let coords = row[..dimension]
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    cell.to_number().ok_or_else(|| {
                        PredictError::validation(format!(
                            "row {} column {}: '{}' is not a finite number",
                            row_number,
                            column + 1,
                            cell
                        ))
                    })
                })
                .collect::<PredictResult<Vec<f64>>>()?;

            let label = match labels {
                LabelKind::Unlabeled => None,
                LabelKind::Category => {
                    let name = row[dimension].to_text();
                    if name.is_empty() {
                        return Err(PredictError::validation(format!(
                            "row {}: label is empty",
                            row_number
                        )));
                    }
                    Some(Label::Category(name))
                }
                LabelKind::Target => {
                    let cell = &row[dimension];
                    let value = cell.to_number().ok_or_else(|| {
                        PredictError::validation(format!(
                            "row {}: target '{}' is not a finite number",
                            row_number, cell
                        ))
                    })?;
                    Some(Label::Target(value))
                }
            };

            points.push(Point { coords, label });
        }

        Ok(Self { points, dimension })
    }

    /// Wrap already-built points, enforcing the same invariants as [`build`](Self::build)
    pub fn from_points(points: Vec<Point>) -> PredictResult<Self> {
        let dimension = points
            .first()
            .map(Point::dimension)
            .ok_or_else(|| PredictError::validation("no sample points supplied"))?;

        if dimension == 0 {
            return Err(PredictError::validation("points need at least one coordinate"));
        }

        for (index, point) in points.iter().enumerate() {
            if point.dimension() != dimension {
                return Err(PredictError::validation(format!(
                    "point {} has {} coordinate(s) but point 1 has {}",
                    index + 1,
                    point.dimension(),
                    dimension
                )));
            }
            if point.coords.iter().any(|c| !c.is_finite()) {
                return Err(PredictError::validation(format!(
                    "point {} has a non-finite coordinate",
                    index + 1
                )));
            }
        }

        Ok(Self { points, dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Split form text into raw rows.
///
/// Rows are separated by `;` or newlines, cells by `,`. Blank rows are
/// skipped.
pub fn parse_rows(text: &str) -> Vec<Vec<RawField>> {
    text.split(|c: char| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .map(|row| row.split(',').map(|cell| RawField::from(cell.trim())).collect())
        .collect()
}

/// Parse a comma-separated coordinate list such as `"0, 0.5"`
pub fn parse_coordinates(text: &str) -> PredictResult<Vec<f64>> {
    let coords = text
        .split(',')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    PredictError::validation(format!("query value '{}' is not a finite number", cell))
                })
        })
        .collect::<PredictResult<Vec<f64>>>()?;

    if coords.is_empty() {
        return Err(PredictError::validation("query has no coordinates"));
    }
    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Vec<RawField>> {
        parse_rows(text)
    }

    #[test]
    fn test_build_labeled_rows() {
        let set = PointSet::build(&rows("0,0,A;0,1,A;5,5,B"), LabelKind::Category).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.dimension(), 2);
        assert_eq!(set.points()[2].coords, vec![5.0, 5.0]);
        assert_eq!(
            set.points()[2].label,
            Some(Label::Category("B".to_string()))
        );
    }

    #[test]
    fn test_build_from_json_rows() {
        let raw: Vec<Vec<RawField>> = serde_json::from_str(r#"[[0, 0, "A"], [1.5, "2", 7]]"#).unwrap();
        let set = PointSet::build(&raw, LabelKind::Category).unwrap();
        assert_eq!(set.points()[1].coords, vec![1.5, 2.0]);
        assert_eq!(
            set.points()[1].label,
            Some(Label::Category("7".to_string()))
        );
    }

    #[test]
    fn test_build_targets() {
        let set = PointSet::build(&rows("0,0\n1,2\n2,4"), LabelKind::Target).unwrap();
        assert_eq!(set.dimension(), 1);
        assert_eq!(set.points()[2].label, Some(Label::Target(4.0)));
    }

    #[test]
    fn test_build_unlabeled() {
        let set = PointSet::build(&rows("1,2,3"), LabelKind::Unlabeled).unwrap();
        assert_eq!(set.dimension(), 3);
        assert!(set.points()[0].label.is_none());
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let err = PointSet::build(&rows("0,0,A;0,1"), LabelKind::Category).unwrap_err();
        assert!(matches!(err, PredictError::Validation(ref m) if m.contains("row 2")));
    }

    #[test]
    fn test_non_numeric_coordinate_rejected() {
        let err = PointSet::build(&rows("0,x,A"), LabelKind::Category).unwrap_err();
        assert!(matches!(err, PredictError::Validation(ref m) if m.contains("column 2")));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        assert!(PointSet::build(&rows("NaN,1"), LabelKind::Target).is_err());
        assert!(PointSet::build(&rows("1,inf"), LabelKind::Target).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = PointSet::build(&[], LabelKind::Category).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationError);
    }

    #[test]
    fn test_label_only_row_rejected() {
        assert!(PointSet::build(&rows("A"), LabelKind::Category).is_err());
    }

    #[test]
    fn test_from_points_checks_dimension() {
        let err = PointSet::from_points(vec![
            Point::new(vec![0.0, 1.0]),
            Point::new(vec![2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, PredictError::Validation(_)));
    }

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let parsed = parse_rows(" 0, 1 ,A ;\n\n; 2,3,B");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0][2], RawField::Text("A".to_string()));
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("0, 0.5").unwrap(), vec![0.0, 0.5]);
        assert!(parse_coordinates("").is_err());
        assert!(parse_coordinates("1,a").is_err());
    }
}
