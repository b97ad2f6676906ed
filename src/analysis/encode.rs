//! Model-matrix encoding of a formula over table rows.
//!
//! Column 0 is always the intercept. Categorical variables use treatment
//! coding against their first level in sorted order (numbers before text,
//! numbers ascending); interaction columns are products of the member
//! variables' columns with the first variable varying fastest.

use std::cmp::Ordering;
use std::fmt;

use ndarray::{Array2, Axis};

use crate::design::Level;
use crate::model::{Formula, Term, Variable};
use crate::table::TabularData;

/// Sort key of a categorical level.
#[derive(Debug, Clone)]
enum LevelKey {
    Number(f64),
    Text(String),
}

impl LevelKey {
    fn of(level: &Level) -> Option<Self> {
        match level {
            Level::Int(v) => Some(Self::Number(*v as f64)),
            Level::Real(v) if !v.is_nan() => Some(Self::Number(*v)),
            Level::Label(s) => Some(Self::Text(s.clone())),
            Level::Real(_) | Level::Missing => None,
        }
    }
}

impl PartialEq for LevelKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LevelKey {}

impl PartialOrd for LevelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LevelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Encoded model matrix.
#[derive(Debug, Clone)]
pub(crate) struct ModelMatrix {
    /// Shape (rows, columns), intercept first.
    pub x: Array2<f64>,
    /// Column names, `Intercept` first.
    pub names: Vec<String>,
    /// Column indices of each formula term, in term order.
    pub term_columns: Vec<Vec<usize>>,
}

impl ModelMatrix {
    /// The intercept plus the columns of the selected terms.
    pub fn columns_for(&self, terms: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut cols = vec![0];
        for t in terms {
            cols.extend_from_slice(&self.term_columns[t]);
        }
        cols.sort_unstable();
        cols
    }

    /// The sub-matrix made of the given columns.
    pub fn select(&self, cols: &[usize]) -> Array2<f64> {
        self.x.select(Axis(1), cols)
    }
}

type NamedColumn = (String, Vec<f64>);

fn cell<'a, T: TabularData + ?Sized>(
    table: &'a T,
    row: usize,
    name: &str,
) -> Result<&'a Level, String> {
    table
        .cell(row, name)
        .ok_or_else(|| format!("column `{name}` is missing"))
}

fn variable_columns<T: TabularData + ?Sized>(
    table: &T,
    rows: &[usize],
    variable: &Variable,
) -> Result<Vec<NamedColumn>, String> {
    match variable {
        Variable::Categorical(name) => {
            let keys = rows
                .iter()
                .map(|&r| {
                    let level = cell(table, r, name)?;
                    LevelKey::of(level)
                        .ok_or_else(|| format!("factor `{name}` is missing in row {r}"))
                })
                .collect::<Result<Vec<LevelKey>, String>>()?;

            let mut levels = keys.clone();
            levels.sort();
            levels.dedup();

            Ok(levels
                .iter()
                .skip(1)
                .map(|level| {
                    let values = keys
                        .iter()
                        .map(|k| if k == level { 1.0 } else { 0.0 })
                        .collect();
                    (format!("{variable}[T.{level}]"), values)
                })
                .collect())
        }
        Variable::Numeric(name) | Variable::Square(name) => {
            let values = rows
                .iter()
                .map(|&r| {
                    let level = cell(table, r, name)?;
                    let v = level.as_f64().ok_or_else(|| {
                        format!("factor `{name}` has non-numeric value `{level}` in row {r}")
                    })?;
                    Ok(if matches!(variable, Variable::Square(_)) {
                        v * v
                    } else {
                        v
                    })
                })
                .collect::<Result<Vec<f64>, String>>()?;
            Ok(vec![(variable.to_string(), values)])
        }
    }
}

fn term_columns<T: TabularData + ?Sized>(
    table: &T,
    rows: &[usize],
    term: &Term,
) -> Result<Vec<NamedColumn>, String> {
    let mut product: Vec<NamedColumn> = vec![(String::new(), vec![1.0; rows.len()])];
    for variable in term.variables() {
        let columns = variable_columns(table, rows, variable)?;
        let mut next = Vec::with_capacity(product.len() * columns.len());
        for (name, values) in &columns {
            for (prefix, acc) in &product {
                let joined = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}:{name}")
                };
                let multiplied = acc.iter().zip(values).map(|(a, b)| a * b).collect();
                next.push((joined, multiplied));
            }
        }
        product = next;
    }
    Ok(product)
}

/// Encode `formula` over the given table rows.
///
/// Errors are human-readable reasons: a missing column, a missing cell or
/// a non-numeric value where a number is required.
pub(crate) fn encode<T: TabularData + ?Sized>(
    table: &T,
    rows: &[usize],
    formula: &Formula,
) -> Result<ModelMatrix, String> {
    let n = rows.len();
    let mut names = vec!["Intercept".to_string()];
    let mut data: Vec<Vec<f64>> = vec![vec![1.0; n]];
    let mut term_cols = Vec::with_capacity(formula.terms().len());

    for term in formula.terms() {
        let mut indices = Vec::new();
        for (name, values) in term_columns(table, rows, term)? {
            indices.push(names.len());
            names.push(name);
            data.push(values);
        }
        term_cols.push(indices);
    }

    let width = names.len();
    let mut x = Array2::<f64>::zeros((n, width));
    for (j, column) in data.iter().enumerate() {
        for (i, &v) in column.iter().enumerate() {
            x[[i, j]] = v;
        }
    }

    Ok(ModelMatrix {
        x,
        names,
        term_columns: term_cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormulaClass, ModelSpec};
    use crate::table::DataTable;

    fn table() -> DataTable {
        DataTable::from_columns(vec![
            (
                "A",
                vec![Level::Int(2), Level::Int(1), Level::Int(3), Level::Int(1)],
            ),
            (
                "B",
                vec![
                    Level::from("lo"),
                    Level::from("hi"),
                    Level::from("lo"),
                    Level::from("hi"),
                ],
            ),
            (
                "x",
                vec![Level::Real(0.5), Level::Real(-1.0), Level::Int(2), Level::from("3")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_treatment_coding() {
        let formula = ModelSpec::new("y", ["A", "B"], FormulaClass::MainWithInteractions).formula();
        let mm = encode(&table(), &[0, 1, 2, 3], &formula).unwrap();
        assert_eq!(
            mm.names,
            vec![
                "Intercept",
                "C(A)[T.2]",
                "C(A)[T.3]",
                "C(B)[T.lo]",
                "C(A)[T.2]:C(B)[T.lo]",
                "C(A)[T.3]:C(B)[T.lo]",
            ]
        );
        assert_eq!(mm.term_columns, vec![vec![1, 2], vec![3], vec![4, 5]]);
        assert_eq!(mm.x.column(1).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(mm.x.column(3).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(mm.x.column(5).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mm.columns_for([2, 0]), vec![0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_numeric_and_square() {
        let formula = ModelSpec::new("y", ["x"], FormulaClass::QuadraticRsm).formula();
        let mm = encode(&table(), &[0, 1, 2, 3], &formula).unwrap();
        assert_eq!(mm.names, vec!["Intercept", "x", "I(x**2)"]);
        assert_eq!(mm.x.column(1).to_vec(), vec![0.5, -1.0, 2.0, 3.0]);
        assert_eq!(mm.x.column(2).to_vec(), vec![0.25, 1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_non_numeric_factor_rejected() {
        let formula = ModelSpec::new("y", ["B"], FormulaClass::QuadraticRsm).formula();
        let err = encode(&table(), &[0, 1], &formula).unwrap_err();
        assert!(err.contains("non-numeric"));
    }

    #[test]
    fn test_row_subset() {
        let formula = ModelSpec::new("y", ["A"], FormulaClass::MainOnly).formula();
        let mm = encode(&table(), &[1, 3], &formula).unwrap();
        // Only level 1 remains, so the factor adds no columns
        assert_eq!(mm.names, vec!["Intercept"]);
        assert_eq!(mm.term_columns, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_level_order() {
        let mut keys = vec![
            LevelKey::Text("b".into()),
            LevelKey::Number(10.0),
            LevelKey::Text("a".into()),
            LevelKey::Number(2.0),
        ];
        keys.sort();
        let shown: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["2", "10", "a", "b"]);
    }
}
