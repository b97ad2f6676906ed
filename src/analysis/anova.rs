//! Type-II ANOVA decomposition.
//!
//! The sum of squares of a term T compares two nested models: the intercept
//! plus every term that does not contain T, with and without T itself. The
//! term's degrees of freedom are the rank it adds. Every F statistic is
//! tested against the residual mean square of the full model.

use std::fmt;

use ndarray::ArrayView1;

use super::encode::ModelMatrix;
use super::ols::{LeastSquaresSolver, SolveError};
use super::stats::FDistribution;
use crate::model::Term;

/// Term name of the residual row.
pub const RESIDUAL_ROW: &str = "Residual";

/// One row of an ANOVA table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaRow {
    /// Term text, or [`RESIDUAL_ROW`].
    pub term: String,
    /// Degrees of freedom.
    pub df: usize,
    /// Sum of squares.
    pub sum_sq: f64,
    /// Mean square; `None` when `df` is 0.
    pub mean_sq: Option<f64>,
    /// F statistic; `None` for the residual row and untestable terms.
    pub f_value: Option<f64>,
    /// Upper-tail p-value of `f_value`.
    pub p_value: Option<f64>,
}

/// Term rows in formula order followed by the residual row.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaTable {
    rows: Vec<AnovaRow>,
}

impl AnovaTable {
    /// All rows, residual last.
    #[must_use]
    pub fn rows(&self) -> &[AnovaRow] {
        &self.rows
    }

    /// Row of a term by its text, e.g. `"C(A)"` or `"x1:x2"`.
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|r| r.term == name)
    }

    /// The residual row.
    #[must_use]
    pub fn residual(&self) -> Option<&AnovaRow> {
        self.term(RESIDUAL_ROW)
    }

    /// Term rows only.
    pub fn terms(&self) -> impl Iterator<Item = &AnovaRow> {
        self.rows.iter().filter(|r| r.term != RESIDUAL_ROW)
    }
}

impl fmt::Display for AnovaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.term.len())
            .max()
            .unwrap_or(0)
            .max(4);
        writeln!(
            f,
            "{:<width$} {:>4} {:>12} {:>12} {:>10} {:>10}",
            "term", "df", "sum_sq", "mean_sq", "F", "PR(>F)"
        )?;
        let opt = |v: Option<f64>, prec: usize| {
            v.map_or_else(|| "-".to_string(), |v| format!("{v:.prec$}"))
        };
        for row in &self.rows {
            writeln!(
                f,
                "{:<width$} {:>4} {:>12.4} {:>12} {:>10} {:>10}",
                row.term,
                row.df,
                row.sum_sq,
                opt(row.mean_sq, 4),
                opt(row.f_value, 4),
                opt(row.p_value, 4),
            )?;
        }
        Ok(())
    }
}

/// Decompose the full model's fit into Type-II term rows.
pub(crate) fn type_two<S, D>(
    terms: &[Term],
    model: &ModelMatrix,
    y: ArrayView1<'_, f64>,
    rss: f64,
    df_resid: usize,
    solver: &S,
    distribution: &D,
) -> Result<AnovaTable, SolveError>
where
    S: LeastSquaresSolver + ?Sized,
    D: FDistribution + ?Sized,
{
    let mse = rss / df_resid as f64;
    let mut rows = Vec::with_capacity(terms.len() + 1);

    for (t, term) in terms.iter().enumerate() {
        let others: Vec<usize> = terms
            .iter()
            .enumerate()
            .filter(|(_, other)| !term.is_contained_in(other))
            .map(|(i, _)| i)
            .collect();

        let base_cols = model.columns_for(others.iter().copied());
        let with_cols = model.columns_for(others.iter().copied().chain([t]));

        let base = solver.solve(model.select(&base_cols).view(), y)?;
        let with = solver.solve(model.select(&with_cols).view(), y)?;

        let df = with.rank.saturating_sub(base.rank);
        let sum_sq = if df == 0 {
            0.0
        } else {
            (base.rss - with.rss).max(0.0)
        };
        let mean_sq = (df > 0).then(|| sum_sq / df as f64);
        let f_value = mean_sq.filter(|_| mse > 0.0).map(|ms| ms / mse);
        let p_value = f_value.map(|fv| distribution.survival(fv, df as f64, df_resid as f64));

        tracing::trace!(term = %term, df, sum_sq, ?f_value, "type II sum of squares");

        rows.push(AnovaRow {
            term: term.to_string(),
            df,
            sum_sq,
            mean_sq,
            f_value,
            p_value,
        });
    }

    rows.push(AnovaRow {
        term: RESIDUAL_ROW.to_string(),
        df: df_resid,
        sum_sq: rss,
        mean_sq: Some(mse),
        f_value: None,
        p_value: None,
    });

    Ok(AnovaTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::encode::encode;
    use crate::analysis::ols::QrSolver;
    use crate::analysis::stats::IncompleteBetaF;
    use crate::design::Level;
    use crate::model::{FormulaClass, ModelSpec};
    use crate::table::DataTable;
    use ndarray::Array1;

    fn run(table: &DataTable, spec: &ModelSpec, y: &[f64]) -> AnovaTable {
        let formula = spec.formula();
        let rows: Vec<usize> = (0..y.len()).collect();
        let model = encode(table, &rows, &formula).unwrap();
        let y = Array1::from(y.to_vec());
        let fit = QrSolver::default().solve(model.x.view(), y.view()).unwrap();
        let df_resid = y.len() - fit.rank;
        type_two(
            formula.terms(),
            &model,
            y.view(),
            fit.rss,
            df_resid,
            &QrSolver::default(),
            &IncompleteBetaF,
        )
        .unwrap()
    }

    #[test]
    fn test_one_way_by_hand() {
        let table = DataTable::from_columns(vec![(
            "A",
            vec![Level::from("a"), Level::from("a"), Level::from("b"), Level::from("b")],
        )])
        .unwrap();
        let spec = ModelSpec::new("y", ["A"], FormulaClass::MainOnly);
        let anova = run(&table, &spec, &[1.0, 2.0, 3.0, 4.0]);

        let a = anova.term("C(A)").unwrap();
        assert_eq!(a.df, 1);
        assert!((a.sum_sq - 4.0).abs() < 1e-10);
        assert!((a.f_value.unwrap() - 8.0).abs() < 1e-10);
        assert!((a.p_value.unwrap() - 0.105_572_809).abs() < 1e-6);

        let resid = anova.residual().unwrap();
        assert_eq!(resid.df, 2);
        assert!((resid.sum_sq - 1.0).abs() < 1e-10);
        assert_eq!(anova.terms().count(), 1);
    }

    #[test]
    fn test_balanced_two_way_partition() {
        // Balanced 2x2 with replicates: Type II equals the sequential partition
        let a: Vec<Level> = [1, 2, 1, 2, 1, 2, 1, 2].iter().map(|&v| Level::Int(v)).collect();
        let b: Vec<Level> = [1, 1, 2, 2, 1, 1, 2, 2].iter().map(|&v| Level::Int(v)).collect();
        let table = DataTable::from_columns(vec![("A", a), ("B", b)]).unwrap();
        let y = [10.0, 14.0, 11.0, 17.0, 12.0, 15.0, 10.0, 18.0];
        let spec = ModelSpec::new("y", ["A", "B"], FormulaClass::MainWithInteractions);
        let anova = run(&table, &spec, &y);

        let mean = y.iter().sum::<f64>() / 8.0;
        let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        let explained: f64 = anova.rows().iter().map(|r| r.sum_sq).sum();
        assert!((explained - tss).abs() < 1e-9);

        // A: level means 10.75 vs 16.0
        let ss_a = 8.0 * (16.0 - 10.75f64).powi(2) / 4.0;
        assert!((anova.term("C(A)").unwrap().sum_sq - ss_a).abs() < 1e-9);
        assert_eq!(anova.term("C(A):C(B)").unwrap().df, 1);
        assert_eq!(anova.residual().unwrap().df, 4);
    }

    #[test]
    fn test_display() {
        let table = DataTable::from_columns(vec![(
            "A",
            vec![Level::Int(1), Level::Int(1), Level::Int(2), Level::Int(2)],
        )])
        .unwrap();
        let spec = ModelSpec::new("y", ["A"], FormulaClass::MainOnly);
        let text = run(&table, &spec, &[1.0, 2.0, 3.0, 4.0]).to_string();
        assert!(text.contains("C(A)"));
        assert!(text.contains(RESIDUAL_ROW));
    }
}
