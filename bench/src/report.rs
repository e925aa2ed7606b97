use std::fmt;

/// One labelled sequence of per-trial measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().sum::<f64>() / self.points.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.points.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.points.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Summary of one scenario, printed as a plain-text table.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub unit: &'static str,
    pub series: Vec<Series>,
}

impl Report {
    pub fn new(title: impl Into<String>, unit: &'static str, series: Vec<Series>) -> Self {
        Self {
            title: title.into(),
            unit,
            series,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.unit)?;
        let width = self
            .series
            .iter()
            .map(|s| s.label.len())
            .max()
            .unwrap_or(0)
            .max("series".len());
        writeln!(
            f,
            "  {:<width$}  {:>12}  {:>12}  {:>12}  {:>6}",
            "series", "min", "mean", "max", "trials"
        )?;
        for s in &self.series {
            writeln!(
                f,
                "  {:<width$}  {:>12.4}  {:>12.4}  {:>12.4}  {:>6}",
                s.label,
                s.min(),
                s.mean(),
                s.max(),
                s.points.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarises_points() {
        let s = Series::new("division", vec![1.0, 3.0, 2.0]);
        assert_eq!(s.min(), 1.0);
        assert_eq!(s.max(), 3.0);
        assert_eq!(s.mean(), 2.0);
        assert_eq!(Series::new("empty", vec![]).mean(), 0.0);
    }

    #[test]
    fn renders_one_row_per_series() {
        let report = Report::new(
            "Longest chain",
            "nodes",
            vec![
                Series::new("division", vec![1.0]),
                Series::new("multiplication", vec![2.0, 4.0]),
            ],
        );
        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Longest chain [nodes]");
        assert!(lines[3].contains("multiplication"));
        assert!(lines[3].contains("3.0000"));
    }
}
