use rand::prelude::*;
use serde::{Serialize, Deserialize};
use std::ops::{Sub, Mul};

use crate::error::{LossError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Uniform samples in [-scale, scale).
    pub fn random(rows: usize, cols: usize, scale: f64) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = (rng.gen::<f64>() * 2.0 - 1.0) * scale;
            }
        }

        res
    }

    /// Builds a matrix from row vectors, rejecting ragged input.
    ///
    /// An empty `data` gives a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(LossError::ShapeMismatch {
                what: "matrix row",
                expected: format!("{cols} columns"),
                got: format!("{} columns in row {i}", row.len()),
            });
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// A single-column matrix, e.g. per-example weights.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect()
        }
    }

    /// A single-row matrix, e.g. per-class weights.
    pub fn row(values: &[f64]) -> Matrix {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: vec![values.to_vec()]
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    /// Checks that `data` really holds `rows` rows of `cols` values.
    ///
    /// Matrices built through `from_data` always pass; struct literals and
    /// deserialized values may not.
    pub fn check_layout(&self, what: &'static str) -> Result<()> {
        if self.data.len() != self.rows {
            return Err(LossError::ShapeMismatch {
                what,
                expected: format!("{} rows", self.rows),
                got: format!("{} rows in data", self.data.len()),
            });
        }
        if let Some((i, row)) = self.data.iter().enumerate().find(|(_, row)| row.len() != self.cols) {
            return Err(LossError::ShapeMismatch {
                what,
                expected: format!("{} columns", self.cols),
                got: format!("{} columns in row {i}", row.len()),
            });
        }
        Ok(())
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_layout("element-wise operand")?;
        other.check_layout("element-wise operand")?;
        if self.shape() != other.shape() {
            return Err(LossError::ShapeMismatch {
                what: "element-wise operand",
                expected: shape_str(self.shape()),
                got: shape_str(other.shape()),
            });
        }

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(other.data.iter())
                .map(|(row_a, row_b)| {
                    row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect()
                })
                .collect()
        })
    }

    /// Element-wise product where `other` is broadcast along any axis of
    /// length 1 (rows×cols, rows×1, 1×cols or 1×1).
    pub fn broadcast_mul(&self, other: &Matrix) -> Result<Matrix> {
        self.check_layout("loss")?;
        other.check_layout("weight")?;
        let rows_ok = other.rows == self.rows || other.rows == 1;
        let cols_ok = other.cols == self.cols || other.cols == 1;
        if !rows_ok || !cols_ok {
            return Err(LossError::ShapeMismatch {
                what: "weight",
                expected: format!("broadcastable to {}", shape_str(self.shape())),
                got: shape_str(other.shape()),
            });
        }

        let mut res = self.clone();
        for i in 0..self.rows {
            let wi = if other.rows == 1 { 0 } else { i };
            for j in 0..self.cols {
                let wj = if other.cols == 1 { 0 } else { j };
                res.data[i][j] *= other.data[wi][wj];
            }
        }

        Ok(res)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Arithmetic mean over all elements; NaN when empty.
    pub fn mean(&self) -> f64 {
        self.sum() / self.len() as f64
    }
}

fn shape_str((rows, cols): (usize, usize)) -> String {
    format!("[{rows}, {cols}]")
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}
