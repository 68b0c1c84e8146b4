//! Summary table: descriptive statistics of the numeric columns.

use super::statistics::{mean, quantile_sorted, sorted, std_dev};
use crate::types::ColumnKind;
use crate::utils::{column_kind, present_numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One row of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Count,
    Mean,
    Std,
    Min,
    Q25,
    Median,
    Q75,
    Max,
}

impl Statistic {
    /// All statistics in display order.
    pub const ALL: [Statistic; 8] = [
        Statistic::Count,
        Statistic::Mean,
        Statistic::Std,
        Statistic::Min,
        Statistic::Q25,
        Statistic::Median,
        Statistic::Q75,
        Statistic::Max,
    ];

    /// Row label as shown in the rendered table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Min => "min",
            Self::Q25 => "25%",
            Self::Median => "50%",
            Self::Q75 => "75%",
            Self::Max => "max",
        }
    }
}

/// Statistics of one column. Anything not computable is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    /// Describe a numeric Series over its non-missing values.
    pub fn from_series(series: &Series) -> PolarsResult<Self> {
        let values = present_numeric_values(series)?;
        let ordered = sorted(&values);

        Ok(Self {
            name: series.name().to_string(),
            count: values.len(),
            mean: mean(&values),
            std: std_dev(&values, 1),
            min: ordered.first().copied(),
            q25: quantile_sorted(&ordered, 0.25),
            median: quantile_sorted(&ordered, 0.5),
            q75: quantile_sorted(&ordered, 0.75),
            max: ordered.last().copied(),
        })
    }

    /// Only the count of non-missing cells, for non-numeric columns.
    fn count_only(series: &Series) -> Self {
        Self {
            name: series.name().to_string(),
            count: series.len() - series.null_count(),
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        }
    }

    /// Value of one statistic.
    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Count => Some(self.count as f64),
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
            Statistic::Min => self.min,
            Statistic::Q25 => self.q25,
            Statistic::Median => self.median,
            Statistic::Q75 => self.q75,
            Statistic::Max => self.max,
        }
    }
}

/// Descriptive statistics of a table: one row per [`Statistic`], one column
/// per numeric column.
///
/// When the table has no numeric column the summary degrades to the `count`
/// row alone, with one entry per column of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    columns: Vec<ColumnStatistics>,
    count_only: bool,
}

impl SummaryTable {
    /// Compute the summary of a table.
    pub fn describe(df: &DataFrame) -> PolarsResult<Self> {
        let numeric: Vec<&Column> = df
            .get_columns()
            .iter()
            .filter(|col| column_kind(col.dtype()) == ColumnKind::Numeric)
            .collect();

        if numeric.is_empty() {
            let columns = df
                .get_columns()
                .iter()
                .map(|col| ColumnStatistics::count_only(col.as_materialized_series()))
                .collect();
            return Ok(Self {
                columns,
                count_only: true,
            });
        }

        let columns = numeric
            .into_iter()
            .map(|col| ColumnStatistics::from_series(col.as_materialized_series()))
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(Self {
            columns,
            count_only: false,
        })
    }

    /// True when the table had no numeric column and only counts are present.
    pub fn is_count_only(&self) -> bool {
        self.count_only
    }

    /// Statistics rows present in this summary.
    pub fn statistics(&self) -> &'static [Statistic] {
        if self.count_only {
            &Statistic::ALL[..1]
        } else {
            &Statistic::ALL
        }
    }

    /// Per-column statistics in column order.
    pub fn columns(&self) -> &[ColumnStatistics] {
        &self.columns
    }

    /// Statistics of a named column.
    pub fn column(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Single cell of the table.
    pub fn value(&self, statistic: Statistic, column: &str) -> Option<f64> {
        if !self.statistics().contains(&statistic) {
            return None;
        }
        self.column(column).and_then(|c| c.get(statistic))
    }

    /// The summary as a DataFrame with a leading `statistic` label column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let labels: Vec<&str> = self.statistics().iter().map(|s| s.label()).collect();
        let mut columns = vec![Column::new("statistic".into(), labels)];

        for column in &self.columns {
            let values: Vec<Option<f64>> = self
                .statistics()
                .iter()
                .map(|s| column.get(*s))
                .collect();
            columns.push(Column::new(column.name.as_str().into(), values));
        }

        DataFrame::new(columns)
    }

    /// Render the summary as fixed-width text.
    ///
    /// Columns are split into blocks so no line exceeds `max_width`
    /// characters (a single column wider than that gets its own block).
    pub fn render_text(&self, max_width: Option<usize>) -> String {
        let statistics = self.statistics();
        let label_width = statistics
            .iter()
            .map(|s| s.label().len())
            .max()
            .unwrap_or(0);

        let cells: Vec<(String, Vec<String>, usize)> = self
            .columns
            .iter()
            .map(|column| {
                let values: Vec<String> = statistics
                    .iter()
                    .map(|s| format_cell(column.get(*s)))
                    .collect();
                let width = values
                    .iter()
                    .map(String::len)
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0);
                (column.name.clone(), values, width)
            })
            .collect();

        if cells.is_empty() {
            return statistics
                .iter()
                .map(|s| s.label().to_string())
                .collect::<Vec<_>>()
                .join("\n");
        }

        let mut blocks: Vec<Vec<&(String, Vec<String>, usize)>> = Vec::new();
        let mut current: Vec<&(String, Vec<String>, usize)> = Vec::new();
        let mut line_width = label_width;
        for cell in &cells {
            let needed = cell.2 + 2;
            if let Some(limit) = max_width
                && !current.is_empty()
                && line_width + needed > limit
            {
                blocks.push(std::mem::take(&mut current));
                line_width = label_width;
            }
            current.push(cell);
            line_width += needed;
        }
        blocks.push(current);

        let mut lines: Vec<String> = Vec::new();
        for (block_index, block) in blocks.iter().enumerate() {
            if block_index > 0 {
                lines.push(String::new());
            }

            let mut header = " ".repeat(label_width);
            for (name, _, width) in block {
                header.push_str(&format!("  {:>width$}", name, width = *width));
            }
            lines.push(header);

            for (row, statistic) in statistics.iter().enumerate() {
                let mut line = format!("{:<width$}", statistic.label(), width = label_width);
                for (_, values, width) in block {
                    line.push_str(&format!("  {:>width$}", values[row], width = *width));
                }
                lines.push(line);
            }
        }

        lines.join("\n")
    }
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => "NaN".to_string(),
    }
}
